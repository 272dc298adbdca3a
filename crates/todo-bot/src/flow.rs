//! Conversation flow
//!
//! A chat is always in one [`ConversationState`]. Button labels and slash
//! commands start a flow from any state; plain command words (`list`,
//! `login`) only count while idle. Every other message is consumed by the
//! current state's step function. The last step of a flow calls the API and returns the
//! session to [`ConversationState::Idle`] on success and failure alike, so a
//! failed submission is never retried with stale scratch data.
//!
//! ```text
//! register: RegisterUsername -> RegisterPassword -> (register) -> Idle
//! login:    LoginUsername    -> LoginPassword    -> (login)    -> Idle
//! add:      AddTask                              -> (add)      -> Idle
//! edit:     (list) EditAskId -> EditAskText      -> (edit)     -> Idle
//! delete:   (list) DeleteAskId                   -> (delete)   -> Idle
//! ```

use crate::api::{ApiError, TodoApi};
use todo_common::ItemView;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    Idle,
    RegisterUsername,
    RegisterPassword,
    LoginUsername,
    LoginPassword,
    AddTask,
    EditAskId,
    EditAskText,
    DeleteAskId,
}

/// Values collected by earlier steps of the current flow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scratch {
    pub username: Option<String>,
    pub item_id: Option<i64>,
}

/// Everything the bot remembers about one chat
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub state: ConversationState,
    pub scratch: Scratch,
    pub token: Option<String>,
    /// Items as last shown to the user; ordinals typed by the user index into this.
    pub snapshot: Vec<ItemView>,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    fn enter(&mut self, state: ConversationState) {
        self.state = state;
        self.scratch = Scratch::default();
    }

    /// Back to idle, dropping whatever the current flow collected.
    pub fn finish(&mut self) {
        self.enter(ConversationState::Idle);
    }
}

/// Menu commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    List,
    Add,
    Edit,
    Delete,
    Login,
    Register,
    Logout,
}

impl Command {
    /// Keyboard rows, as shown under the message box
    pub const MENU: [&'static [Command]; 4] = [
        &[Command::List, Command::Add],
        &[Command::Edit, Command::Delete],
        &[Command::Login, Command::Register],
        &[Command::Logout],
    ];

    pub fn label(self) -> &'static str {
        match self {
            Command::Start => "/start",
            Command::List => "📋 My To-Do List",
            Command::Add => "➕ Add Task",
            Command::Edit => "✏️ Edit Task",
            Command::Delete => "❌ Delete Task",
            Command::Login => "🔑 Login",
            Command::Register => "🆕 Register",
            Command::Logout => "🚪 Logout",
        }
    }

    /// Recognize a button label or a slash command (`/start`, `/list@my_bot`).
    ///
    /// Recognized in every state, so these always interrupt a flow.
    pub fn parse(input: &str) -> Option<Self> {
        const ALL: [Command; 8] = [
            Command::Start,
            Command::List,
            Command::Add,
            Command::Edit,
            Command::Delete,
            Command::Login,
            Command::Register,
            Command::Logout,
        ];

        let input = input.trim();
        if let Some(cmd) = ALL.into_iter().find(|cmd| cmd.label() == input) {
            return Some(cmd);
        }

        let word = input.strip_prefix('/')?;
        let word = word.split('@').next().unwrap_or(word);
        Self::from_word(word)
    }

    /// Plain-word alias such as `list` or `Login`.
    ///
    /// Only meaningful while idle; inside a flow the same text is field input.
    pub fn parse_alias(input: &str) -> Option<Self> {
        Self::from_word(input.trim())
    }

    fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start),
            "list" => Some(Command::List),
            "add" => Some(Command::Add),
            "edit" => Some(Command::Edit),
            "delete" => Some(Command::Delete),
            "login" => Some(Command::Login),
            "register" => Some(Command::Register),
            "logout" => Some(Command::Logout),
            _ => None,
        }
    }
}

/// What to send back to the chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Attach the main menu keyboard
    pub show_menu: bool,
    /// Drop this chat's session once the reply is sent
    pub end_session: bool,
}

impl Reply {
    pub fn menu(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            show_menu: true,
            end_session: false,
        }
    }

    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            show_menu: false,
            end_session: false,
        }
    }
}

/// Render items as `N. text` lines, 1-based.
pub fn render_list(items: &[ItemView]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Map a 1-based ordinal typed by the user to an item id in `snapshot`.
pub fn resolve_ordinal(snapshot: &[ItemView], input: &str) -> Option<i64> {
    let n: usize = input.trim().parse().ok()?;
    n.checked_sub(1)
        .and_then(|idx| snapshot.get(idx))
        .map(|item| item.id)
}

/// Advance `session` by one incoming message.
pub async fn handle<A>(api: &A, session: &mut Session, input: &str) -> Reply
where
    A: TodoApi + ?Sized,
{
    let input = input.trim();

    let cmd = Command::parse(input).or_else(|| match session.state {
        ConversationState::Idle => Command::parse_alias(input),
        _ => None,
    });
    if let Some(cmd) = cmd {
        debug!("[Flow] Command {:?} in state {:?}", cmd, session.state);
        return start(api, session, cmd).await;
    }

    match session.state {
        ConversationState::Idle => Reply::menu("Choose an action from the menu."),
        ConversationState::RegisterUsername => on_register_username(session, input),
        ConversationState::RegisterPassword => on_register_password(api, session, input).await,
        ConversationState::LoginUsername => on_login_username(session, input),
        ConversationState::LoginPassword => on_login_password(api, session, input).await,
        ConversationState::AddTask => on_add_task(api, session, input).await,
        ConversationState::EditAskId => on_edit_ask_id(session, input),
        ConversationState::EditAskText => on_edit_ask_text(api, session, input).await,
        ConversationState::DeleteAskId => on_delete_ask_id(api, session, input).await,
    }
}

async fn start<A>(api: &A, session: &mut Session, cmd: Command) -> Reply
where
    A: TodoApi + ?Sized,
{
    match cmd {
        Command::Start => {
            *session = Session::default();
            Reply::menu("Welcome! Choose an action:")
        }
        Command::Logout => {
            *session = Session::default();
            Reply {
                end_session: true,
                ..Reply::menu("You have been logged out.")
            }
        }
        Command::Register => {
            session.enter(ConversationState::RegisterUsername);
            Reply::prompt("Enter new username:")
        }
        Command::Login => {
            session.enter(ConversationState::LoginUsername);
            Reply::prompt("Enter username:")
        }
        Command::List => {
            session.finish();
            let Some(token) = session.token.clone() else {
                return Reply::menu("Please login first.");
            };
            match refresh_snapshot(api, session, &token).await {
                Ok(()) if session.snapshot.is_empty() => Reply::menu("Your list is empty."),
                Ok(()) => Reply::menu(format!("Your To-Do:\n{}", render_list(&session.snapshot))),
                Err(e) => failure(session, "Error fetching list", &e),
            }
        }
        Command::Add => {
            session.finish();
            if !session.is_logged_in() {
                return Reply::menu("Please login first.");
            }
            session.enter(ConversationState::AddTask);
            Reply::prompt("Enter new task text:")
        }
        Command::Edit => {
            pick_item(api, session, ConversationState::EditAskId, "Enter task number to edit:")
                .await
        }
        Command::Delete => {
            pick_item(
                api,
                session,
                ConversationState::DeleteAskId,
                "Enter task number to delete:",
            )
            .await
        }
    }
}

/// Refresh the snapshot and, if it has anything in it, ask for an ordinal.
async fn pick_item<A>(
    api: &A,
    session: &mut Session,
    next: ConversationState,
    question: &str,
) -> Reply
where
    A: TodoApi + ?Sized,
{
    session.finish();
    let Some(token) = session.token.clone() else {
        return Reply::menu("Please login first.");
    };

    if let Err(e) = refresh_snapshot(api, session, &token).await {
        return failure(session, "Error fetching list", &e);
    }
    if session.snapshot.is_empty() {
        return Reply::menu("Your list is empty.");
    }

    session.enter(next);
    Reply::prompt(format!("{}\n{}", render_list(&session.snapshot), question))
}

async fn refresh_snapshot<A>(api: &A, session: &mut Session, token: &str) -> Result<(), ApiError>
where
    A: TodoApi + ?Sized,
{
    session.snapshot = api.list(token).await?;
    Ok(())
}

/// Report a failed call and return to idle; an auth failure also forgets the token.
fn failure(session: &mut Session, context: &str, err: &ApiError) -> Reply {
    session.finish();
    if err.is_unauthorized() {
        session.token = None;
        session.snapshot.clear();
    }
    Reply::menu(format!("{}: {}", context, err))
}

fn invalid_number(session: &mut Session) -> Reply {
    session.finish();
    Reply::menu("Invalid number.")
}

fn on_register_username(session: &mut Session, input: &str) -> Reply {
    session.scratch.username = Some(input.to_string());
    session.state = ConversationState::RegisterPassword;
    Reply::prompt("Enter password:")
}

async fn on_register_password<A>(api: &A, session: &mut Session, input: &str) -> Reply
where
    A: TodoApi + ?Sized,
{
    let username = session.scratch.username.take().unwrap_or_default();
    match api.register(&username, input).await {
        Ok(()) => {
            session.finish();
            info!("[Flow] Registered {}", username);
            Reply::menu("Registration successful! Please login.")
        }
        Err(e) => failure(session, "Registration error", &e),
    }
}

fn on_login_username(session: &mut Session, input: &str) -> Reply {
    session.scratch.username = Some(input.to_string());
    session.state = ConversationState::LoginPassword;
    Reply::prompt("Enter password:")
}

async fn on_login_password<A>(api: &A, session: &mut Session, input: &str) -> Reply
where
    A: TodoApi + ?Sized,
{
    let username = session.scratch.username.take().unwrap_or_default();
    match api.login(&username, input).await {
        Ok(token) => {
            session.finish();
            session.token = Some(token);
            session.snapshot.clear();
            info!("[Flow] Logged in as {}", username);
            Reply::menu("Login successful.")
        }
        Err(e) => failure(session, "Login error", &e),
    }
}

async fn on_add_task<A>(api: &A, session: &mut Session, input: &str) -> Reply
where
    A: TodoApi + ?Sized,
{
    let Some(token) = session.token.clone() else {
        session.finish();
        return Reply::menu("Please login first.");
    };
    match api.add(&token, input).await {
        Ok(_) => {
            session.finish();
            Reply::menu("Task added.")
        }
        Err(e) => failure(session, "Error adding", &e),
    }
}

fn on_edit_ask_id(session: &mut Session, input: &str) -> Reply {
    let Some(id) = resolve_ordinal(&session.snapshot, input) else {
        return invalid_number(session);
    };
    session.scratch.item_id = Some(id);
    session.state = ConversationState::EditAskText;
    Reply::prompt("Enter new text:")
}

async fn on_edit_ask_text<A>(api: &A, session: &mut Session, input: &str) -> Reply
where
    A: TodoApi + ?Sized,
{
    let (Some(token), Some(id)) = (session.token.clone(), session.scratch.item_id) else {
        return invalid_number(session);
    };
    match api.edit(&token, id, input).await {
        Ok(()) => {
            session.finish();
            session.snapshot.clear();
            Reply::menu("Task edited.")
        }
        Err(e) => failure(session, "Error editing", &e),
    }
}

async fn on_delete_ask_id<A>(api: &A, session: &mut Session, input: &str) -> Reply
where
    A: TodoApi + ?Sized,
{
    let Some(id) = resolve_ordinal(&session.snapshot, input) else {
        return invalid_number(session);
    };
    let Some(token) = session.token.clone() else {
        session.finish();
        return Reply::menu("Please login first.");
    };
    match api.delete(&token, id).await {
        Ok(()) => {
            session.finish();
            session.snapshot.clear();
            Reply::menu("Task deleted.")
        }
        Err(e) => failure(session, "Error deleting", &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(texts: &[&str]) -> Vec<ItemView> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| ItemView {
                id: (i as i64 + 1) * 10,
                text: t.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("🆕 Register"), Some(Command::Register));
        assert_eq!(Command::parse(" 🚪 Logout "), Some(Command::Logout));
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/start@todo_bot"), Some(Command::Start));
        assert_eq!(Command::parse("/List"), Some(Command::List));
        assert_eq!(Command::parse("List"), None);
        assert_eq!(Command::parse("login"), None);
        assert_eq!(Command::parse("buy milk"), None);
        assert_eq!(Command::parse("2"), None);
    }

    #[test]
    fn test_parse_alias() {
        assert_eq!(Command::parse_alias(" List "), Some(Command::List));
        assert_eq!(Command::parse_alias("LOGOUT"), Some(Command::Logout));
        assert_eq!(Command::parse_alias("/list"), None);
        assert_eq!(Command::parse_alias("buy milk"), None);
    }

    #[test]
    fn test_every_menu_label_parses_back() {
        for row in Command::MENU {
            for cmd in row {
                assert_eq!(Command::parse(cmd.label()), Some(*cmd));
            }
        }
    }

    #[test]
    fn test_resolve_ordinal() {
        let snapshot = items(&["a", "b", "c"]);
        assert_eq!(resolve_ordinal(&snapshot, "1"), Some(10));
        assert_eq!(resolve_ordinal(&snapshot, " 3 "), Some(30));
        assert_eq!(resolve_ordinal(&snapshot, "0"), None);
        assert_eq!(resolve_ordinal(&snapshot, "4"), None);
        assert_eq!(resolve_ordinal(&snapshot, "-1"), None);
        assert_eq!(resolve_ordinal(&snapshot, "two"), None);
        assert_eq!(resolve_ordinal(&[], "1"), None);
    }

    #[test]
    fn test_render_list_is_one_based() {
        assert_eq!(render_list(&items(&["milk", "eggs"])), "1. milk\n2. eggs");
        assert_eq!(render_list(&[]), "");
    }
}
