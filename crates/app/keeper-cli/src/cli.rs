use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use keeper_core::models::records::{DataType, RecordInput};

#[derive(Parser, Debug)]
#[command(name = "keeper", author, version, about = "Keeper secrets client", long_about = None)]
pub struct Cli {
    /// Server base URL.
    #[arg(long, global = true, env = "KEEPER_SERVER", default_value = "http://127.0.0.1:8080")]
    pub server: String,

    /// Where session cookies are kept between runs.
    #[arg(long, global = true, env = "KEEPER_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Log requests to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account and sign in
    Register(Credentials),
    /// Sign in
    Login(Credentials),
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List records
    List {
        /// Only records of this kind
        #[arg(long = "type", value_enum)]
        kind: Option<KindArg>,
    },
    /// Store a new record
    Add(RecordArgs),
    /// Show one record
    Show { id: u64 },
    /// Replace a record's fields
    Update {
        id: u64,
        #[command(flatten)]
        record: RecordArgs,
    },
    /// Delete a record
    Delete { id: u64 },
    /// Print version information
    Version,
}

#[derive(Args, Debug)]
pub struct Credentials {
    #[arg(long, env = "KEEPER_LOGIN")]
    pub login: String,
    #[arg(long, env = "KEEPER_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    #[arg(long = "type", value_enum)]
    pub kind: KindArg,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long)]
    pub value: String,
}

impl From<RecordArgs> for RecordInput {
    fn from(args: RecordArgs) -> Self {
        RecordInput {
            kind: args.kind.into(),
            description: args.description,
            value: args.value,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Credentials,
    Text,
    Binary,
    BankCard,
}

impl From<KindArg> for DataType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Credentials => DataType::Credentials,
            KindArg::Text => DataType::Text,
            KindArg::Binary => DataType::Binary,
            KindArg::BankCard => DataType::BankCard,
        }
    }
}
