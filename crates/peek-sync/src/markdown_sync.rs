// Textarea to panel Markdown sync: every edit of the description textarea is
// pushed to the surface as a full MARKDOWN snapshot.

use peek_core::Message;

use crate::link::PanelLink;

#[derive(Debug, Default)]
pub struct MarkdownSync {
    attached: bool,
}

impl MarkdownSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Bind to the textarea whose current value is `textarea`, pushing that
    /// value right away. Fails when the textarea is missing.
    pub fn setup(&mut self, textarea: Option<&str>, link: &mut PanelLink) -> bool {
        let Some(value) = textarea else {
            log::error!("description textarea not found");
            return false;
        };
        if !link.has_panel() {
            log::error!("no panel to sync into");
            return false;
        }
        self.attached = true;
        self.push(value, link);
        true
    }

    /// Forward an input event's value.
    pub fn on_input(&self, value: &str, link: &mut PanelLink) {
        if self.attached {
            self.push(value, link);
        }
    }

    pub fn push(&self, value: &str, link: &mut PanelLink) {
        link.send(Message::Markdown {
            content: value.to_string(),
        });
    }

    pub fn cleanup(&mut self) {
        self.attached = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_requires_textarea_and_panel() {
        let mut link = PanelLink::new();
        let mut sync = MarkdownSync::new();
        assert!(!sync.setup(None, &mut link));
        assert!(!sync.setup(Some("x"), &mut link));

        link.create();
        assert!(sync.setup(Some("# Hi"), &mut link));
        assert_eq!(
            link.pending(),
            &[Message::Markdown { content: "# Hi".into() }]
        );
    }

    #[test]
    fn input_is_forwarded_only_while_attached() {
        let mut link = PanelLink::new();
        link.create();
        let mut sync = MarkdownSync::new();
        sync.on_input("ignored", &mut link);
        assert!(link.pending().is_empty());

        sync.setup(Some(""), &mut link);
        assert!(sync.is_attached());
        sync.on_input("typed", &mut link);
        assert_eq!(
            link.pending(),
            &[Message::Markdown { content: "typed".into() }]
        );

        sync.cleanup();
        assert!(!sync.is_attached());
        sync.on_input("after", &mut link);
        assert_eq!(link.pending().len(), 1);
    }
}
