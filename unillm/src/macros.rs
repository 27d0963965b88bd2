/// Creates a single chat [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use unillm::{Role, unillm_msg};
///
/// let message = unillm_msg!(assistant => "Done.");
/// assert_eq!(message.role, Role::Assistant);
/// assert_eq!(message.content, "Done.");
///
/// let result = unillm_msg!(tool("call_1") => "42");
/// assert_eq!(result.tool_call_id.as_deref(), Some("call_1"));
/// ```
#[macro_export]
macro_rules! unillm_msg {
    (system => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::System, $content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::User, $content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::Assistant, $content)
    };
    (tool($call_id:expr) => $content:expr $(,)?) => {
        $crate::Message::tool_result($call_id, $content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, assistant, or tool(call_id)");
    };
}

/// Creates a `Vec<Message>` from role/content pairs.
///
/// ```rust
/// use unillm::{Role, unillm_messages};
///
/// let messages = unillm_messages![
///     system => "You are concise.",
///     user => "Summarize this repository.",
/// ];
///
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[0].role, Role::System);
/// assert_eq!(messages[1].role, Role::User);
/// ```
#[macro_export]
macro_rules! unillm_messages {
    () => {
        Vec::<$crate::Message>::new()
    };
    ($($role:ident $(($call_id:expr))? => $content:expr),+ $(,)?) => {
        vec![$($crate::unillm_msg!($role $(($call_id))? => $content)),+]
    };
}
