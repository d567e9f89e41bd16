//! Command-line front end.
//!
//! Each invocation runs one command through the matching screen, the way a UI
//! would. Commands that need an identity sign in first with `--email` and
//! `--password` (or `MESSMATE_EMAIL` / `MESSMATE_PASSWORD`).

use crate::{
    auth::AuthUser,
    core::{MessRepository, UserRepository},
    errors::{Error, Result},
    models::{
        DiscussionCategory, DiscussionFilter, FeedbackCategory, FeedbackStatus, MealType, MenuItem,
    },
    screens::{
        AttendanceScreen, AuthMode, AuthState, DiscussScreen, FeedbackScreen, MenuScreen,
        ScreenMessage, Session, SignInScreen,
    },
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use tracing::debug;

/// Parsed command line.
#[derive(Parser, Debug)]
#[command(name = "messmate", version)]
#[command(about = "Mess hall menus, attendance, feedback and discussions")]
#[command(after_help = "Dates are yyyy-mm-dd and default to today.")]
pub struct Cli {
    /// Account email, used to sign in or sign up
    #[arg(long, global = true, env = "MESSMATE_EMAIL")]
    pub email: Option<String>,
    /// Account password
    #[arg(long, global = true, env = "MESSMATE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Email and password, when both were given.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        Some(Credentials {
            email: self.email.clone()?,
            password: self.password.clone()?,
        })
    }
}

/// What `attend` does to a meal's mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AttendAction {
    /// Mark present
    Present,
    /// Mark absent
    Absent,
    /// Flip the current mark, or mark present if there is none
    Toggle,
}

/// One `messmate` subcommand.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Create an account for --email / --password
    Signup {
        /// Given name
        first_name: String,
        /// Family name
        last_name: String,
    },
    /// Show the menu for a day
    Menu {
        /// Day, yyyy-mm-dd
        #[arg(long)]
        date: Option<NaiveDate>,
        /// breakfast, lunch or dinner
        #[arg(long)]
        meal: Option<MealType>,
    },
    /// Add a menu item (admin)
    AddMenu {
        /// Day, yyyy-mm-dd
        date: NaiveDate,
        /// breakfast, lunch or dinner
        meal: MealType,
        /// Price in the local currency
        price: f64,
        /// Dish name
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Show your attendance marks for a day
    Attendance {
        /// Day, yyyy-mm-dd
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Mark, unmark or toggle a meal
    Attend {
        /// breakfast, lunch or dinner
        meal: MealType,
        /// present, absent or toggle
        #[arg(value_enum)]
        action: AttendAction,
        /// Day, yyyy-mm-dd
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Submit feedback
    Feedback {
        /// 1 to 5 stars
        rating: u8,
        /// food_quality, service, cleanliness or other
        category: FeedbackCategory,
        /// Short title
        title: String,
        /// Details
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },
    /// Your feedback, newest first
    MyFeedback,
    /// Every feedback entry, newest first
    AllFeedback,
    /// Move feedback to reviewed or resolved (admin)
    FeedbackStatus {
        /// Document id
        id: String,
        /// pending, reviewed or resolved
        status: FeedbackStatus,
    },
    /// List discussions, optionally for one category
    Discussions {
        /// general, complaints, suggestions, announcements or all
        #[arg(default_value = "all")]
        filter: DiscussionFilter,
    },
    /// Start a discussion
    Post {
        /// Category
        category: DiscussionCategory,
        /// Short title
        title: String,
        /// Text
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },
    /// Reply to a discussion
    Reply {
        /// Document id
        id: String,
        /// Text
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },
    /// Like a discussion
    Like {
        /// Document id
        id: String,
    },
}

impl Command {
    const fn needs_sign_in(&self) -> bool {
        !matches!(self, Self::Signup { .. } | Self::Menu { .. })
    }
}

/// Email and password used to sign in before a command runs.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Text to print and whether the command succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Rendered output or error message
    pub text: String,
    /// Whether the binary should exit successfully
    pub success: bool,
}

impl Outcome {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: true,
        }
    }

    fn failed(text: impl std::fmt::Display) -> Self {
        Self {
            text: format!("error: {text}"),
            success: false,
        }
    }

    fn from_screen(succeeded: bool, message: Option<&ScreenMessage>, done: &str) -> Self {
        match (succeeded, message) {
            (_, Some(ScreenMessage::Error(text))) => Self::failed(text),
            (true, Some(ScreenMessage::Info(text))) => Self::ok(text.clone()),
            (true, None) => Self::ok(done),
            (false, _) => Self::failed("the operation did not complete"),
        }
    }
}

/// Repositories the commands run against.
#[derive(Debug, Clone)]
pub struct App {
    /// Menu, attendance, feedback and discussion operations
    pub mess: MessRepository,
    /// Account and profile operations
    pub users: UserRepository,
}

impl App {
    async fn sign_in(&self, credentials: Option<&Credentials>) -> Result<AuthUser> {
        let credentials = credentials.ok_or(Error::NotSignedIn)?;
        let mut screen = SignInScreen::new(self.users.clone());
        screen.mode = AuthMode::SignIn;
        screen.email.clone_from(&credentials.email);
        screen.password.clone_from(&credentials.password);

        match screen.submit().await {
            AuthState::Success => self.users.current_user().await.ok_or(Error::NotSignedIn),
            AuthState::Error(message) => Err(Error::SignInFailed { message }),
            AuthState::Idle | AuthState::Pending => Err(Error::NotSignedIn),
        }
    }

    /// Runs one command, filling omitted dates with `today`. Errors from signing
    /// in are returned; failures inside a screen are reported in the [`Outcome`].
    pub async fn run(
        &self,
        command: Command,
        credentials: Option<&Credentials>,
        today: NaiveDate,
    ) -> Result<Outcome> {
        let user = if command.needs_sign_in() {
            Some(self.sign_in(credentials).await?)
        } else {
            None
        };
        debug!("Running {:?}", command);

        match (command, user) {
            (
                Command::Signup {
                    first_name,
                    last_name,
                },
                _,
            ) => {
                let credentials = credentials.ok_or_else(|| {
                    Error::validation("credentials", "sign-up needs --email and --password")
                })?;
                let mut screen = SignInScreen::new(self.users.clone());
                screen.mode = AuthMode::SignUp;
                screen.email.clone_from(&credentials.email);
                screen.password.clone_from(&credentials.password);
                screen.first_name = first_name;
                screen.last_name = last_name;
                Ok(match screen.submit().await {
                    AuthState::Success => Outcome::ok(format!("Welcome, {}!", screen.first_name)),
                    AuthState::Error(message) => Outcome::failed(message),
                    AuthState::Idle | AuthState::Pending => {
                        Outcome::failed("sign-up did not complete")
                    }
                })
            }
            (Command::Menu { date, meal }, _) => {
                let date = date.unwrap_or(today);
                let mut screen = MenuScreen::new(self.mess.clone(), date);
                screen.meal_filter = meal;
                if !screen.load().await {
                    return Ok(Outcome::from_screen(false, screen.message(), ""));
                }
                Ok(Outcome::ok(render_menu(date, &screen.visible_items())))
            }
            (
                Command::AddMenu {
                    date,
                    meal,
                    price,
                    name,
                },
                _,
            ) => {
                let mut screen = MenuScreen::new(self.mess.clone(), date);
                let item = MenuItem::new(name.join(" "), meal, price, date);
                let added = screen.add_item(item).await;
                Ok(Outcome::from_screen(added, screen.message(), "Menu item added"))
            }
            (Command::Attendance { date }, Some(user)) => {
                let date = date.unwrap_or(today);
                let mut screen = AttendanceScreen::new(self.mess.clone(), user, date);
                if !screen.load().await {
                    return Ok(Outcome::from_screen(false, screen.message(), ""));
                }
                let mut text = format!("Attendance for {date}");
                for (meal, mark) in screen.summary() {
                    let mark = match mark {
                        Some(true) => "present",
                        Some(false) => "absent",
                        None => "not marked",
                    };
                    let _ = write!(text, "\n  {meal:<10} {mark}");
                }
                Ok(Outcome::ok(text))
            }
            (Command::Attend { meal, action, date }, Some(user)) => {
                let date = date.unwrap_or(today);
                let mut screen = AttendanceScreen::new(self.mess.clone(), user, date);
                if !screen.load().await {
                    return Ok(Outcome::from_screen(false, screen.message(), ""));
                }
                let done = match action {
                    AttendAction::Present => screen.mark(meal, true).await,
                    AttendAction::Absent => screen.mark(meal, false).await,
                    AttendAction::Toggle => screen.toggle(meal).await,
                };
                let state = screen
                    .record_for(meal)
                    .map_or("not marked", |r| if r.is_present { "present" } else { "absent" });
                Ok(Outcome::from_screen(
                    done,
                    screen.message(),
                    &format!("{meal} on {date}: {state}"),
                ))
            }
            (
                Command::Feedback {
                    rating,
                    category,
                    title,
                    description,
                },
                Some(user),
            ) => {
                let mut screen = FeedbackScreen::new(self.mess.clone(), user);
                screen.form.rating = rating;
                screen.form.category = category;
                screen.form.title = title;
                screen.form.description = description.join(" ");
                let submitted = screen.submit().await;
                Ok(Outcome::from_screen(submitted, screen.message(), "Feedback submitted"))
            }
            (Command::MyFeedback, Some(user)) => {
                let mut screen = FeedbackScreen::new(self.mess.clone(), user);
                if !screen.load_history().await {
                    return Ok(Outcome::from_screen(false, screen.message(), ""));
                }
                Ok(Outcome::ok(render_feedback(screen.history())))
            }
            (Command::AllFeedback, Some(_)) => Ok(match self.mess.get_all_feedback().await {
                Ok(all) => Outcome::ok(render_feedback(&all)),
                Err(e) => Outcome::failed(e),
            }),
            (Command::FeedbackStatus { id, status }, Some(_)) => {
                Ok(match self.mess.update_feedback_status(&id, status).await {
                    Ok(_) => Outcome::ok(format!("Feedback {id} is now {status}")),
                    Err(e) => Outcome::failed(e),
                })
            }
            (Command::Discussions { filter }, Some(_)) => {
                let mut screen = DiscussScreen::new(self.mess.clone(), self.session().await?);
                if !screen.select_filter(filter).await {
                    return Ok(Outcome::from_screen(false, screen.message(), ""));
                }
                Ok(Outcome::ok(render_discussions(&screen)))
            }
            (
                Command::Post {
                    category,
                    title,
                    content,
                },
                Some(_),
            ) => {
                let mut screen = DiscussScreen::new(self.mess.clone(), self.session().await?);
                screen.draft.category = category;
                screen.draft.title = title;
                screen.draft.content = content.join(" ");
                let posted = screen.post().await;
                Ok(Outcome::from_screen(posted, screen.message(), "Posted"))
            }
            (Command::Reply { id, content }, Some(_)) => {
                let mut screen = DiscussScreen::new(self.mess.clone(), self.session().await?);
                let replied = screen.reply(&id, &content.join(" ")).await;
                Ok(Outcome::from_screen(replied, screen.message(), "Reply added"))
            }
            (Command::Like { id }, Some(_)) => {
                let mut screen = DiscussScreen::new(self.mess.clone(), self.session().await?);
                let liked = screen.like(&id).await;
                Ok(Outcome::from_screen(liked, screen.message(), "Liked"))
            }
            (_, None) => Err(Error::NotSignedIn),
        }
    }

    async fn session(&self) -> Result<Session> {
        Session::load(&self.users).await
    }
}

fn render_menu(date: NaiveDate, items: &[&MenuItem]) -> String {
    if items.is_empty() {
        return format!("No menu items for {date}");
    }
    let mut text = format!("Menu for {date}");
    for item in items {
        let availability = if item.is_available { "" } else { " (unavailable)" };
        let _ = write!(
            text,
            "\n  [{}] {} - {:.2}{}",
            item.category, item.name, item.price, availability
        );
        if !item.description.is_empty() {
            let _ = write!(text, "\n      {}", item.description);
        }
    }
    text
}

fn render_feedback(entries: &[crate::models::Feedback]) -> String {
    if entries.is_empty() {
        return "No feedback yet".to_string();
    }
    let mut text = String::new();
    for entry in entries {
        let _ = writeln!(
            text,
            "{} [{}] {}/5 {} ({}) - {}",
            entry.id, entry.status, entry.rating, entry.title, entry.category, entry.user_email
        );
    }
    text.trim_end().to_string()
}

fn render_discussions(screen: &DiscussScreen) -> String {
    if screen.discussions().is_empty() {
        return "No discussions yet".to_string();
    }
    let mut text = String::new();
    for thread in screen.discussions() {
        let _ = writeln!(
            text,
            "{} [{}] {} by {} - {} likes, {} replies",
            thread.id,
            thread.category,
            thread.title,
            thread.user_name,
            thread.likes,
            thread.replies.len()
        );
        for reply in &thread.replies {
            let _ = writeln!(text, "    {}: {}", reply.user_name, reply.content);
        }
    }
    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{errors::ErrorKind, test_utils::*};
    use clap::CommandFactory;

    fn parse(line: &str) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("messmate").chain(line.split_whitespace()))
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_optional_dates_and_typed_args() {
        let cli = parse("menu --meal Lunch").unwrap();
        assert_eq!(
            cli.command,
            Command::Menu {
                date: None,
                meal: Some(MealType::Lunch)
            }
        );

        let cli = parse("attend dinner toggle --date 2024-05-01").unwrap();
        assert_eq!(
            cli.command,
            Command::Attend {
                meal: MealType::Dinner,
                action: AttendAction::Toggle,
                date: Some(test_date()),
            }
        );

        let cli = parse("discussions").unwrap();
        assert_eq!(
            cli.command,
            Command::Discussions {
                filter: DiscussionFilter::All
            }
        );
    }

    #[test]
    fn test_parse_collects_free_text() {
        let cli = parse("--email a@uni.edu feedback 4 service Friendly staff served quickly")
            .unwrap();
        assert_eq!(cli.email.as_deref(), Some("a@uni.edu"));
        match cli.command {
            Command::Feedback {
                rating,
                category,
                title,
                description,
            } => {
                assert_eq!(rating, 4);
                assert_eq!(category, FeedbackCategory::Service);
                assert_eq!(title, "Friendly");
                assert_eq!(description.join(" "), "staff served quickly");
            }
            other => panic!("expected feedback, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse("menu --date 05/01/2024").is_err());
        assert!(parse("attend brunch present").is_err());
        assert!(parse("attend lunch maybe").is_err());
        assert!(parse("discussions rants").is_err());
        assert!(parse("reply abc").is_err());
        assert!(parse("launch").is_err());
    }

    #[tokio::test]
    async fn test_commands_end_to_end() -> Result<()> {
        let test_app = setup_test_app().await?;
        let app = App {
            mess: test_app.mess.clone(),
            users: test_app.users.clone(),
        };
        let today = test_date();
        let asha = credentials("asha@uni.edu", "secret1");

        let signup = parse("signup Asha Rao").unwrap().command;
        assert!(app.run(signup, Some(&asha), today).await?.success);

        let attend = parse("attend dinner present").unwrap().command;
        let outcome = app.run(attend, Some(&asha), today).await?;
        assert!(outcome.success);
        assert!(outcome.text.contains("present"));

        let post = parse("post complaints Cold rice at dinner").unwrap().command;
        assert!(app.run(post, Some(&asha), today).await?.success);

        let list = parse("discussions complaints").unwrap().command;
        let outcome = app.run(list, Some(&asha), today).await?;
        assert!(outcome.text.contains("Cold by Asha Rao"));

        let status = parse("feedback-status abc reviewed").unwrap().command;
        let outcome = app.run(status, Some(&asha), today).await?;
        assert!(!outcome.success);
        Ok(())
    }

    #[tokio::test]
    async fn test_signed_commands_need_credentials() -> Result<()> {
        let test_app = setup_test_app().await?;
        let app = App {
            mess: test_app.mess.clone(),
            users: test_app.users.clone(),
        };
        let result = app.run(Command::MyFeedback, None, test_date()).await;
        assert!(matches!(result, Err(Error::NotSignedIn)));
        Ok(())
    }

    #[tokio::test]
    async fn test_bad_credentials_are_an_auth_error() -> Result<()> {
        let test_app = setup_test_app().await?;
        test_app.sign_up("asha@uni.edu").await?;
        test_app.users.logout().await;
        let app = App {
            mess: test_app.mess.clone(),
            users: test_app.users.clone(),
        };

        let wrong = credentials("asha@uni.edu", "not-it");
        let err = app
            .run(Command::MyFeedback, Some(&wrong), test_date())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SignInFailed { .. }));
        assert_eq!(err.kind(), ErrorKind::Auth);
        Ok(())
    }
}
