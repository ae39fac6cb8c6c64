/// What the frame loop should do after `get_current_texture` failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface lost or outdated and has been configured again.
    Reconfigured,
    /// Timeout or other transient failure; drop this frame.
    SkipFrame,
    /// Out of memory; the session cannot continue.
    Fatal,
}
