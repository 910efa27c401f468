use clap::{Parser as ClapParser, Subcommand};
use clause_lang::cli::{self, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "clause")]
#[command(about = "Clause - parse, check and evaluate filter expressions in several dialects")]
#[command(version)]
struct Cli {
    /// Log parser internals (tokens, RPN, joins)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an expression and evaluate it
    Check {
        /// The expression to check
        expression: String,

        /// Dialect: odata, java, sharp or sql
        #[arg(short, long, env = "CLAUSE_DIALECT")]
        dialect: Option<String>,

        /// JSON document for field references (reads from stdin if piped)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,
    },

    /// Show the token stream of an expression
    Tokens {
        /// The expression to tokenize
        expression: String,

        /// Dialect: odata, java, sharp or sql
        #[arg(short, long, env = "CLAUSE_DIALECT")]
        dialect: Option<String>,
    },

    /// List dialects, or show one dialect's operators
    Dialects {
        /// Dialect name
        name: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            expression,
            dialect,
            input,
            pretty,
            syntax_only,
        } => run_check(expression, dialect, input, pretty, syntax_only),
        Commands::Tokens {
            expression,
            dialect,
        } => cli::execute_tokens(&expression, dialect.as_deref()).map(|lines| {
            for line in lines {
                println!("{}", line);
            }
        }),
        Commands::Dialects { name: None } => {
            print!("{}", cli::dialect_overview());
            Ok(())
        }
        Commands::Dialects { name: Some(name) } => {
            cli::describe_dialect(&name).map(|text| print!("{}", text))
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("clause_lang=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_check(
    expression: String,
    dialect: Option<String>,
    input: Option<String>,
    pretty: bool,
    syntax_only: bool,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = CheckOptions {
        expression,
        dialect,
        input,
        syntax_only,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid(rendered) => println!("Syntax is valid: {}", rendered),
        CheckResult::Success(output) => {
            let json = if pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }?;
            println!("{}", json);
        }
    }
    Ok(())
}
