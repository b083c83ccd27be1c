use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use textbook_assistant::models::{ChatMessage, Role};
use textbook_assistant::services::{
    AuthClient, ChannelNotifier, Notification, NotificationLevel, RagClient,
};
use textbook_assistant::storage::FileStore;
use textbook_assistant::telemetry;
use textbook_assistant::utils::MessageView;
use textbook_assistant::{AuthPhase, AuthSession, ChatSession, Settings};

const HELP: &str = "Commands: /login <email> <password>, /signup <email> <password> [full name], \
/logout, /whoami, /ask <selected text>, /quit. Anything else is sent as a question.";

enum Command<'a> {
    Login { email: &'a str, password: &'a str },
    Signup { email: &'a str, password: &'a str, full_name: Option<String> },
    Logout,
    WhoAmI,
    Ask(&'a str),
    Help,
    Quit,
    Message(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        if !line.starts_with('/') {
            return Some(Command::Message(line));
        }

        let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let mut args = rest.split_whitespace();

        match name {
            "/login" => Some(Command::Login {
                email: args.next()?,
                password: args.next()?,
            }),
            "/signup" => {
                let email = args.next()?;
                let password = args.next()?;
                let full_name = args.collect::<Vec<_>>().join(" ");
                Some(Command::Signup {
                    email,
                    password,
                    full_name: (!full_name.is_empty()).then_some(full_name),
                })
            }
            "/logout" => Some(Command::Logout),
            "/whoami" => Some(Command::WhoAmI),
            "/ask" => Some(Command::Ask(rest)),
            "/help" => Some(Command::Help),
            "/quit" | "/exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

fn print_message(message: &ChatMessage) {
    let view = MessageView::from_message(message);
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };

    println!("[{}] {}> {}", view.timestamp, speaker, message.content);
    if !view.sources.is_empty() {
        println!("    Sources:");
        for source in &view.sources {
            println!("      {}", source);
        }
    }
    if let Some(badge) = view.confidence_badge {
        println!("    ({})", badge);
    }
}

fn print_notification(notification: &Notification) {
    let marker = match notification.level {
        NotificationLevel::Success => "*",
        NotificationLevel::Error => "!",
    };
    println!("{} {}: {}", marker, notification.title, notification.text);
}

/// What of the chat session has already been printed.
#[derive(Debug, Default)]
struct Transcript {
    shown: usize,
    last_error: Option<String>,
}

impl Transcript {
    /// Print messages appended since the last call, and the error if it changed.
    fn flush(&mut self, chat: &ChatSession) {
        let messages = chat.messages();
        for message in messages.iter().skip(self.shown) {
            print_message(message);
        }
        self.shown = messages.len();

        if let Some(error) = self.take_error(chat.error()) {
            println!("! {}", error);
        }
    }

    fn take_error(&mut self, current: Option<String>) -> Option<String> {
        if current == self.last_error {
            return None;
        }
        self.last_error = current.clone();
        current
    }

    /// Chat commands reset the error, so a repeat of the same text is news.
    fn forget_error(&mut self) {
        self.last_error = None;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_telemetry();

    let settings = Settings::load()?;
    info!("Backend resolves to {}", settings.api.resolve());

    let store = Arc::new(FileStore::new(settings.storage_path()));
    let (notifier, mut notifications) = ChannelNotifier::new();

    let auth = AuthSession::new(
        store,
        Arc::new(AuthClient::new(settings.api.clone())),
        Arc::new(notifier),
    );
    let chat = ChatSession::new(
        Arc::new(RagClient::new(settings.api.clone())),
        settings.chat.clone(),
    );

    tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            print_notification(&notification);
        }
    });

    if auth.initialize() == AuthPhase::Authenticated {
        if let Some(user) = auth.user() {
            println!("Signed in as {}", user.display_name());
        }
    }

    chat.open();
    println!("{}", HELP);
    let mut transcript = Transcript::default();
    transcript.flush(&chat);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = Command::parse(&line) else {
            println!("Unknown command. {}", HELP);
            continue;
        };

        if matches!(command, Command::Ask(_) | Command::Message(_)) {
            transcript.forget_error();
        }

        match command {
            Command::Login { email, password } => {
                auth.open_auth_modal();
                // Failures are already surfaced as notifications
                let _ = auth.login(email, password).await;
            }
            Command::Signup {
                email,
                password,
                full_name,
            } => {
                auth.open_auth_modal();
                let _ = auth.signup(email, password, full_name.as_deref()).await;
            }
            Command::Logout => auth.logout(),
            Command::WhoAmI => match auth.user() {
                Some(user) => println!("{} <{}> (id {})", user.display_name(), user.email, user.id),
                None => println!("Not signed in"),
            },
            Command::Ask(selected) => {
                // Validation errors land in chat.error() and print below
                if let Ok(pending) = chat.ask_about_selection(selected) {
                    pending.await?;
                }
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Message(text) => {
                chat.set_draft(text);
                chat.send_draft().await;
            }
        }

        transcript.flush(&chat);
    }

    info!("Session closed");
    Ok(())
}
