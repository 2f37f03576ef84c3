use peek_core::{Edge, PanelRect, Viewport, MIN_HEIGHT, MIN_WIDTH, PADDING};

// ──────────────────────────────────────────────
// Geometry engine: pure clamping and edge math
// ──────────────────────────────────────────────

/// Largest pointer delta (in px) the engine accepts on one axis.
const MAX_DELTA: i32 = 1_000_000;

/// Share of the viewport width a freshly created panel takes.
const INITIAL_WIDTH_RATIO: f32 = 0.38;

/// Convert a raw pointer delta into whole pixels. NaN and infinities from
/// malformed events become 0.
pub fn sanitize_delta(delta: f32) -> i32 {
    if !delta.is_finite() {
        return 0;
    }
    delta.round().clamp(-(MAX_DELTA as f32), MAX_DELTA as f32) as i32
}

/// Clamp a size into `[min, max]`. When the range is empty the minimum wins.
fn clamp_size(size: i32, min: i32, max: i32) -> i32 {
    size.min(max).max(min)
}

/// Clamp an offset so `[pos, pos + size]` stays `PADDING` away from both ends
/// of an axis of length `extent`. When that is impossible the near padding wins.
fn clamp_offset(pos: i32, size: i32, extent: i32) -> i32 {
    let max = extent.saturating_sub(PADDING).saturating_sub(size);
    pos.min(max).max(PADDING)
}

/// Clamp a candidate rect into the viewport: sizes first, then position.
pub fn clamp_rect(candidate: PanelRect, viewport: Viewport) -> PanelRect {
    let width = clamp_size(
        candidate.width,
        MIN_WIDTH,
        viewport.width.saturating_sub(2 * PADDING),
    );
    let height = clamp_size(
        candidate.height,
        MIN_HEIGHT,
        viewport.height.saturating_sub(2 * PADDING),
    );
    PanelRect {
        top: clamp_offset(candidate.top, height, viewport.height),
        left: clamp_offset(candidate.left, width, viewport.width),
        width,
        height,
    }
}

/// Which side of an axis the dragged handle sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisSide {
    /// West or north: the far edge stays put and the offset moves.
    Near,
    /// East or south: the offset stays put and only the size changes.
    Far,
    Untouched,
}

fn horizontal_side(edge: Edge) -> AxisSide {
    if edge.touches_west() {
        AxisSide::Near
    } else if edge.touches_east() {
        AxisSide::Far
    } else {
        AxisSide::Untouched
    }
}

fn vertical_side(edge: Edge) -> AxisSide {
    if edge.touches_north() {
        AxisSide::Near
    } else if edge.touches_south() {
        AxisSide::Far
    } else {
        AxisSide::Untouched
    }
}

/// Resize one axis. Returns the new `(offset, size)`.
///
/// For the near side the size is clamped first and the offset is derived from
/// it afterwards, so the opposite edge never moves even when both the minimum
/// and the padding limit are hit in the same gesture.
fn resize_axis(start: i32, size: i32, delta: i32, side: AxisSide, min: i32, extent: i32) -> (i32, i32) {
    match side {
        AxisSide::Untouched => (start, size),
        AxisSide::Far => {
            let max = extent
                .saturating_sub(PADDING)
                .saturating_sub(start)
                .max(min);
            (start, size.saturating_add(delta).max(min).min(max))
        }
        AxisSide::Near => {
            let fixed_end = start.saturating_add(size);
            let candidate = start.saturating_add(delta).max(PADDING);
            let max = fixed_end.saturating_sub(PADDING).max(min);
            let new_size = fixed_end.saturating_sub(candidate).max(min).min(max);
            (fixed_end.saturating_sub(new_size), new_size)
        }
    }
}

/// Compute the rect produced by dragging `edge` by `(dx, dy)` from `start`.
///
/// The final `clamp_rect` is the identity whenever `start` already fits the
/// viewport; it only intervenes for viewports too small to hold the minimum
/// size, where containment takes precedence over the anchor.
pub fn resize_from_edge(edge: Edge, start: PanelRect, dx: i32, dy: i32, viewport: Viewport) -> PanelRect {
    let (left, width) = resize_axis(
        start.left,
        start.width,
        dx,
        horizontal_side(edge),
        MIN_WIDTH,
        viewport.width,
    );
    let (top, height) = resize_axis(
        start.top,
        start.height,
        dy,
        vertical_side(edge),
        MIN_HEIGHT,
        viewport.height,
    );
    clamp_rect(
        PanelRect {
            top,
            left,
            width,
            height,
        },
        viewport,
    )
}

/// Move `start` by `(dx, dy)` and keep it inside the viewport.
pub fn translate(start: PanelRect, dx: i32, dy: i32, viewport: Viewport) -> PanelRect {
    clamp_rect(
        PanelRect {
            top: start.top.saturating_add(dy),
            left: start.left.saturating_add(dx),
            ..start
        },
        viewport,
    )
}

/// Placement of a newly created panel: 38% of the viewport wide, full height
/// minus padding, centred.
pub fn initial_rect(viewport: Viewport) -> PanelRect {
    let width = (viewport.width as f32 * INITIAL_WIDTH_RATIO).round() as i32;
    let height = viewport.height.saturating_sub(2 * PADDING);
    let left = (viewport.width.saturating_sub(width) as f32 / 2.0).round() as i32;
    let top = (viewport.height.saturating_sub(height) as f32 / 2.0).round() as i32;
    clamp_rect(PanelRect::new(top, left, width, height), viewport)
}
