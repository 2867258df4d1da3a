use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;

use crate::collection::CollectionKind;
use crate::commands::{ListOptions, LoginMethod};
use crate::types::{COURSES, Fields};

#[derive(Parser)]
#[command(name = "campus")]
#[command(about = "Learning-management administration console")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage students
    #[command(visible_alias = "s")]
    Student {
        #[command(subcommand)]
        action: StudentAction,
    },

    /// Manage instructors
    #[command(visible_alias = "i")]
    Instructor {
        #[command(subcommand)]
        action: InstructorAction,
    },

    /// List the course catalog
    Courses {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign in and out
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

/// Options shared by every `ls`
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Case-insensitive substring matched against names, email and more
    #[arg(short, long)]
    pub search: Option<String>,

    /// Page number, starting at 1
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct StudentFields {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// One of the catalog courses (see `campus courses`)
    #[arg(long, value_parser = parse_course)]
    pub course: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InstructorFields {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub expertise: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
}

/// Collect the provided values into a field map
fn provided<const N: usize>(pairs: [(&str, Option<String>); N]) -> Fields {
    pairs
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
        .collect()
}

impl StudentFields {
    pub fn into_fields(self) -> Fields {
        provided([
            ("first_name", self.first_name),
            ("last_name", self.last_name),
            ("email", self.email),
            ("phone", self.phone),
            ("course", self.course),
        ])
    }
}

impl InstructorFields {
    pub fn into_fields(self) -> Fields {
        provided([
            ("first_name", self.first_name),
            ("last_name", self.last_name),
            ("email", self.email),
            ("phone", self.phone),
            ("expertise", self.expertise),
            ("bio", self.bio),
        ])
    }
}

#[derive(Subcommand)]
pub enum StudentAction {
    /// List students
    Ls {
        #[command(flatten)]
        list: ListArgs,

        /// Only students enrolled in this course ("all" for every course)
        #[arg(short, long, value_parser = parse_course_filter)]
        course: Option<String>,
    },

    /// Register a new student
    Add {
        #[command(flatten)]
        fields: StudentFields,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a student's fields
    Edit {
        /// Student ID
        id: String,

        #[command(flatten)]
        fields: StudentFields,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a student
    Rm {
        /// Student ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum InstructorAction {
    /// List instructors
    Ls {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Add a new instructor
    Add {
        #[command(flatten)]
        fields: InstructorFields,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit an instructor's fields
    Edit {
        /// Instructor ID
        id: String,

        #[command(flatten)]
        fields: InstructorFields,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete an instructor
    Rm {
        /// Instructor ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in with email and password, or with a Google id token
    Login {
        /// Account email
        #[arg(long, required_unless_present = "google_id_token")]
        email: Option<String>,

        /// Password (prompted for when omitted)
        #[arg(long, conflicts_with = "google_id_token")]
        password: Option<String>,

        /// Google id token obtained from a browser sign-in
        #[arg(long, conflicts_with = "email")]
        google_id_token: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an account and sign in
    Signup {
        /// Account email
        #[arg(long)]
        email: String,

        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change the signed-in operator's display name or email
    #[command(group = clap::ArgGroup::new("change").required(true).multiple(true))]
    Profile {
        /// New display name
        #[arg(long, group = "change")]
        name: Option<String>,

        /// New account email
        #[arg(long, group = "change")]
        email: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget the stored session
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the signed-in operator
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a configuration value
    Set {
        /// Key: store.url, store.api_key, store.timeout_secs, auth.api_key
        key: String,

        /// Value
        value: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl ListArgs {
    fn into_options(self, category: Option<String>) -> (ListOptions, bool) {
        (
            ListOptions {
                search: self.search,
                category,
                page: self.page,
            },
            self.json,
        )
    }
}

impl Commands {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self) -> crate::error::Result<()> {
        use crate::commands::{
            cmd_add, cmd_auth_login, cmd_auth_logout, cmd_auth_profile, cmd_auth_signup,
            cmd_auth_whoami, cmd_config_set, cmd_config_show, cmd_courses, cmd_edit, cmd_list, cmd_remove,
        };

        match self {
            Commands::Student { action } => {
                let kind = CollectionKind::Students;
                match action {
                    StudentAction::Ls { list, course } => {
                        let (options, json) = list.into_options(course);
                        cmd_list(kind, options, json).await
                    }
                    StudentAction::Add { fields, json } => {
                        cmd_add(kind, fields.into_fields(), json).await
                    }
                    StudentAction::Edit { id, fields, json } => {
                        cmd_edit(kind, &id, fields.into_fields(), json).await
                    }
                    StudentAction::Rm { id, yes, json } => cmd_remove(kind, &id, yes, json).await,
                }
            }

            Commands::Instructor { action } => {
                let kind = CollectionKind::Instructors;
                match action {
                    InstructorAction::Ls { list } => {
                        let (options, json) = list.into_options(None);
                        cmd_list(kind, options, json).await
                    }
                    InstructorAction::Add { fields, json } => {
                        cmd_add(kind, fields.into_fields(), json).await
                    }
                    InstructorAction::Edit { id, fields, json } => {
                        cmd_edit(kind, &id, fields.into_fields(), json).await
                    }
                    InstructorAction::Rm { id, yes, json } => {
                        cmd_remove(kind, &id, yes, json).await
                    }
                }
            }

            Commands::Courses { json } => cmd_courses(json),

            Commands::Auth { action } => match action {
                AuthAction::Login {
                    email,
                    password,
                    google_id_token,
                    json,
                } => {
                    let method = match (google_id_token, email) {
                        (Some(token), _) => LoginMethod::GoogleIdToken(token),
                        (None, Some(email)) => LoginMethod::Password { email, password },
                        (None, None) => {
                            return Err(crate::error::CampusError::Auth(
                                "either --email or --google-id-token is required".to_string(),
                            ));
                        }
                    };
                    cmd_auth_login(method, json).await
                }
                AuthAction::Signup {
                    email,
                    password,
                    name,
                    json,
                } => cmd_auth_signup(&email, password, name.as_deref(), json).await,
                AuthAction::Profile { name, email, json } => {
                    cmd_auth_profile(name.as_deref(), email.as_deref(), json).await
                }
                AuthAction::Logout { json } => cmd_auth_logout(json),
                AuthAction::Whoami { json } => cmd_auth_whoami(json),
            },

            Commands::Config { action } => match action {
                ConfigAction::Show { json } => cmd_config_show(json),
                ConfigAction::Set { key, value, json } => cmd_config_set(&key, &value, json),
            },

            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn parse_course(s: &str) -> Result<String, String> {
    COURSES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(s))
        .map(|c| c.to_string())
        .ok_or_else(|| format!("Invalid course. Must be one of: {}", COURSES.join(", ")))
}

fn parse_course_filter(s: &str) -> Result<String, String> {
    if s.eq_ignore_ascii_case("all") {
        return Ok("all".to_string());
    }
    parse_course(s)
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "campus", &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_course_is_case_insensitive() {
        assert_eq!(parse_course("ui/ux design").unwrap(), "UI/UX Design");
        assert!(parse_course("Cooking").is_err());
        assert_eq!(parse_course_filter("ALL").unwrap(), "all");
    }

    #[test]
    fn test_only_provided_fields_are_collected() {
        let fields = StudentFields {
            email: Some("a@b.co".to_string()),
            ..StudentFields::default()
        }
        .into_fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["email"], "a@b.co");
    }

    #[test]
    fn test_parses_student_ls() {
        let cli = Cli::try_parse_from([
            "campus", "student", "ls", "--search", "ada", "--course", "all", "--page", "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Student {
                action: StudentAction::Ls { list, course },
            } => {
                assert_eq!(list.search.as_deref(), Some("ada"));
                assert_eq!(list.page, 2);
                assert_eq!(course.as_deref(), Some("all"));
            }
            _ => panic!("expected student ls"),
        }
    }

    #[test]
    fn test_auth_profile_needs_a_change() {
        assert!(Cli::try_parse_from(["campus", "auth", "profile"]).is_err());

        let cli = Cli::try_parse_from(["campus", "auth", "profile", "--email", "desk@uni.edu"])
            .unwrap();
        match cli.command {
            Commands::Auth {
                action: AuthAction::Profile { name, email, .. },
            } => {
                assert!(name.is_none());
                assert_eq!(email.as_deref(), Some("desk@uni.edu"));
            }
            _ => panic!("expected auth profile"),
        }
    }
}
