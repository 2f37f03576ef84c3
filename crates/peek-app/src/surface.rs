// Preview surface
// The isolated document inside the panel. It owns exactly one mount point for
// rendered HTML and one minimize trigger, and knows its parent only as a
// message target.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use peek_core::{MarkdownEngine, Message, MessageKind};
use peek_markdown::{inline_error, RenderWorker};
use peek_sync::{Endpoint, MessageTarget, Subscription};

pub struct Surface {
    endpoint: Endpoint,
    parent: MessageTarget,
    inbox: Rc<RefCell<VecDeque<Message>>>,
    _subscriptions: Vec<Subscription>,
    worker: RenderWorker,
    /// innerHTML of the mount point.
    mount: String,
    hidden: bool,
    /// Latest render that completed while hidden.
    parked: Option<String>,
}

impl Surface {
    /// Load the surface document. `parent` is the host window's endpoint.
    pub fn load<E>(parent: MessageTarget, engine: E) -> io::Result<Self>
    where
        E: MarkdownEngine + Send + 'static,
    {
        let worker = RenderWorker::spawn(engine)?;
        let (endpoint, _) = Endpoint::new("surface");
        let inbox = Rc::new(RefCell::new(VecDeque::new()));

        let subscriptions = [MessageKind::Markdown, MessageKind::Minimize]
            .into_iter()
            .map(|kind| {
                let inbox = inbox.clone();
                endpoint.listen(kind, move |m| inbox.borrow_mut().push_back(m.clone()))
            })
            .collect();

        Ok(Self {
            endpoint,
            parent,
            inbox,
            _subscriptions: subscriptions,
            worker,
            mount: String::new(),
            hidden: false,
            parked: None,
        })
    }

    pub fn target(&self) -> MessageTarget {
        self.endpoint.target()
    }

    pub fn mount_html(&self) -> &str {
        &self.mount
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn renders_in_flight(&self) -> usize {
        self.worker.in_flight()
    }

    /// Minimize trigger click.
    pub fn click_minimize(&self) {
        self.parent.send(&Message::Minimize { minimized: true });
    }

    /// Handle inbound messages and collect finished renders. Returns true when
    /// anything happened.
    pub fn pump(&mut self) -> bool {
        let received = self.endpoint.dispatch() > 0;
        let queued: Vec<Message> = self.inbox.borrow_mut().drain(..).collect();
        for message in queued {
            match message {
                Message::Markdown { content } => {
                    let seq = self.worker.submit(content);
                    log::trace!("surface: render #{} submitted", seq);
                }
                Message::Minimize { minimized } => self.set_hidden(minimized),
                Message::TogglePanelState { .. } => {}
            }
        }

        let mut applied = false;
        while let Some(outcome) = self.worker.try_recv() {
            applied |= self.complete(outcome.seq, outcome.html);
        }
        received || applied
    }

    /// Block until every submitted render has completed, up to `timeout` each.
    pub fn settle(&mut self, timeout: Duration) {
        while self.worker.in_flight() > 0 {
            match self.worker.recv_timeout(timeout) {
                Some(outcome) => {
                    self.complete(outcome.seq, outcome.html);
                }
                None => {
                    log::warn!("surface: render did not finish in {:?}", timeout);
                    break;
                }
            }
        }
    }

    fn complete(&mut self, seq: u64, html: Result<String, peek_core::RenderError>) -> bool {
        if seq < self.worker.latest_seq() {
            log::trace!("surface: stale render #{} dropped", seq);
            return false;
        }
        let html = html.unwrap_or_else(|e| {
            log::error!("Failed to render markdown: {}", e);
            inline_error(&e)
        });
        if self.hidden {
            self.parked = Some(html);
        } else {
            self.mount = html;
        }
        true
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
        if !hidden {
            if let Some(html) = self.parked.take() {
                self.mount = html;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peek_core::RenderError;
    use peek_markdown::MarkdownRenderer;

    const WAIT: Duration = Duration::from_secs(5);

    struct Failing;

    impl MarkdownEngine for Failing {
        fn render(&self, _text: &str) -> Result<String, RenderError> {
            Err(RenderError::Engine("unsupported".into()))
        }
    }

    fn surface() -> (Surface, Endpoint) {
        let (host, parent) = Endpoint::new("host");
        (Surface::load(parent, MarkdownRenderer::new()).unwrap(), host)
    }

    fn deliver(surface: &mut Surface, message: Message) {
        surface.target().send(&message);
        surface.pump();
        surface.settle(WAIT);
    }

    #[test]
    fn markdown_message_renders_into_mount() {
        let (mut surface, _host) = surface();
        deliver(&mut surface, Message::Markdown { content: "# Hi".into() });
        assert!(surface.mount_html().contains("<h1"));
        assert!(surface.mount_html().contains("Hi</h1>"));
    }

    #[test]
    fn only_latest_submission_is_applied() {
        let (mut surface, _host) = surface();
        let target = surface.target();
        target.send(&Message::Markdown { content: "# old".into() });
        target.send(&Message::Markdown { content: "# new".into() });
        surface.pump();
        surface.settle(WAIT);
        assert!(surface.mount_html().contains("new"));
        assert!(!surface.mount_html().contains("old"));
    }

    #[test]
    fn renders_while_hidden_are_parked_until_shown() {
        let (mut surface, _host) = surface();
        deliver(&mut surface, Message::Markdown { content: "first".into() });
        deliver(&mut surface, Message::Minimize { minimized: true });
        deliver(&mut surface, Message::Markdown { content: "second".into() });
        assert!(surface.mount_html().contains("first"));

        deliver(&mut surface, Message::Minimize { minimized: false });
        assert!(surface.mount_html().contains("second"));
    }

    #[test]
    fn engine_failure_shows_inline_error() {
        let (host, parent) = Endpoint::new("host");
        let mut surface = Surface::load(parent, Failing).unwrap();
        deliver(&mut surface, Message::Markdown { content: "x".into() });
        assert!(surface
            .mount_html()
            .starts_with("<div class=\"error\">Failed to render markdown:"));
        drop(host);
    }

    #[test]
    fn minimize_trigger_messages_parent() {
        let (surface, host) = surface();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = host.listen(MessageKind::Minimize, move |m| sink.borrow_mut().push(m.clone()));

        surface.click_minimize();
        host.dispatch();
        assert_eq!(*seen.borrow(), vec![Message::Minimize { minimized: true }]);
    }
}
