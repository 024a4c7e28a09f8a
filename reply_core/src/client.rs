//! The transport the engine talks through.

/// A chat connection the engine drives.
pub trait ChatClient {
    /// Say something in the conversation.
    fn speak(&mut self, text: &str);

    /// Report something to the operator without saying it aloud.
    fn output_info(&mut self, text: &str);

    /// Disconnect.
    fn exit(&mut self);

    /// Show a status label, or clear it with `None`.
    fn set_status(&mut self, label: Option<&str>);
}
