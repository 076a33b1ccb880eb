use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "adjoin")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Join Unix hosts to Active Directory and audit their identities", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print the result as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: ~/.config/adjoin/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// vastool location
    #[arg(long, global = true, value_name = "PATH")]
    pub vastool: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Join the host to a domain (no-op if already joined to it)
    Join(JoinArgs),

    /// Remove the host from its domain (no-op if not joined)
    Unjoin(UnjoinArgs),

    /// Show vastool version and the joined domain
    Status,

    /// Run vastool health checks
    Health,

    /// Check that a join would succeed
    Preflight(PreflightArgs),

    /// List local users mapped to directory accounts
    MappedUsers,

    /// Show the users.allow and users.deny files
    Access,

    /// List directory users allowed to log on
    LogonPolicy,

    /// List local users
    LocalUsers(LocalUsersArgs),

    /// List local groups
    LocalGroups(LocalGroupsArgs),

    /// Find UID/GID collisions in exported directory objects
    #[command(subcommand)]
    Conflicts(IdentityCommand),

    /// List Unix-enabled users or groups in exported directory objects
    #[command(subcommand)]
    UnixEnabled(IdentityCommand),

    /// Regroup a per-host users-allowed report by user
    PolicyByUser {
        /// JSON report: {"host": [[7 passwd fields], ...]}
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },

    /// Show versions of the QAS binaries
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Join / Unjoin
// ============================================================================

#[derive(Args)]
pub struct Credentials {
    /// Account used to join or unjoin
    #[arg(short, long, env = "ADJOIN_USERNAME")]
    pub username: String,

    /// Password for the account
    #[arg(short = 'w', long, env = "ADJOIN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args)]
pub struct JoinArgs {
    /// Domain to join
    pub domain: String,

    #[command(flatten)]
    pub credentials: Credentials,

    /// Computer account name
    #[arg(short = 'n', long)]
    pub account_name: Option<String>,

    /// Container for the computer account
    #[arg(short, long)]
    pub container: Option<String>,

    /// Domain controller to use (repeatable)
    #[arg(short, long = "server")]
    pub servers: Vec<String>,

    /// Extra options passed to vastool unchanged
    #[arg(long, allow_hyphen_values = true)]
    pub extra_args: Option<String>,
}

#[derive(Args)]
pub struct UnjoinArgs {
    #[command(flatten)]
    pub credentials: Credentials,

    /// Computer account name
    #[arg(short = 'n', long)]
    pub account_name: Option<String>,

    /// Extra options passed to vastool unchanged
    #[arg(long, allow_hyphen_values = true)]
    pub extra_args: Option<String>,
}

// ============================================================================
// Preflight
// ============================================================================

#[derive(Args)]
pub struct PreflightArgs {
    /// Domain to check against
    pub domain: String,

    #[command(flatten)]
    pub credentials: Credentials,

    /// Domain controller to check (repeatable)
    #[arg(short, long = "server")]
    pub servers: Vec<String>,

    /// Per-check timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u32>,

    /// Also check time synchronization
    #[arg(long)]
    pub timesync: bool,

    /// Extra options passed to preflight unchanged
    #[arg(long, allow_hyphen_values = true)]
    pub extra_args: Option<String>,

    /// preflight location
    #[arg(long, value_name = "PATH")]
    pub path: Option<PathBuf>,
}

// ============================================================================
// Local accounts
// ============================================================================

#[derive(Args)]
pub struct LocalUsersArgs {
    /// Only users clashing with this planned login name
    #[arg(long, requires = "uid")]
    pub conflicts_with: Option<String>,

    /// UID of the planned account
    #[arg(long, requires = "conflicts_with")]
    pub uid: Option<String>,
}

#[derive(Args)]
pub struct LocalGroupsArgs {
    /// Substring of the group name
    #[arg(long)]
    pub name: Option<String>,

    /// Exact GID
    #[arg(long)]
    pub gid: Option<String>,

    /// Comma-separated users; keep groups containing any of them
    #[arg(long)]
    pub member: Option<String>,

    /// Leave out the member list
    #[arg(long)]
    pub no_members: bool,
}

// ============================================================================
// Directory exports
// ============================================================================

#[derive(Subcommand)]
pub enum IdentityCommand {
    /// Users (uidNumber)
    Users(UserExportArgs),
    /// Groups (gidNumber)
    Groups(GroupExportArgs),
}

#[derive(Args)]
pub struct UserExportArgs {
    /// JSON array of exported directory objects
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Login name attribute
    #[arg(long, default_value = "sAMAccountName")]
    pub login_name_attr: String,

    /// UID number attribute
    #[arg(long, default_value = "uidNumber")]
    pub uid_number_attr: String,

    /// GID number attribute
    #[arg(long, default_value = "gidNumber")]
    pub gid_number_attr: String,

    /// GECOS attribute
    #[arg(long, default_value = "gecos")]
    pub gecos_attr: String,

    /// Home directory attribute
    #[arg(long, default_value = "unixHomeDirectory")]
    pub home_directory_attr: String,

    /// Login shell attribute
    #[arg(long, default_value = "loginShell")]
    pub login_shell_attr: String,
}

#[derive(Args)]
pub struct GroupExportArgs {
    /// JSON array of exported directory objects
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Group name attribute
    #[arg(long, default_value = "sAMAccountName")]
    pub name_attr: String,

    /// GID number attribute
    #[arg(long, default_value = "gidNumber")]
    pub gid_number_attr: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_join() {
        let cli = Cli::try_parse_from([
            "adjoin", "--json", "join", "corp.example.com", "-u", "admin", "-w", "secret", "-s",
            "dc1", "-s", "dc2", "--extra-args", "--skip-config",
        ])
        .unwrap();
        assert!(cli.json);
        let Command::Join(args) = cli.command else {
            panic!("expected join");
        };
        assert_eq!(args.domain, "corp.example.com");
        assert_eq!(args.servers, ["dc1", "dc2"]);
        assert_eq!(args.extra_args.as_deref(), Some("--skip-config"));
    }

    #[test]
    fn test_conflicts_with_requires_uid() {
        assert!(Cli::try_parse_from(["adjoin", "local-users", "--conflicts-with", "bob"]).is_err());
        assert!(
            Cli::try_parse_from(["adjoin", "local-users", "--conflicts-with", "bob", "--uid", "1001"])
                .is_ok()
        );
    }
}
