/**
 * Print a page of a mailbox: sender, subject and date of each message, its plain-text bodies
 * and the names of its attachments.
 *
 * Arguments can come from the command line or the environment (a `.env` file is read too):
 * - IMAP_USERNAME
 * - IMAP_PASSWORD
 * - IMAP_HOST
 * - IMAP_PORT (defaults to 993)
 *
 * cargo run --example read -- --reject daticert.xml --reject smime.p7s user@example.com secret imap.example.com
 *
 * Set RUST_LOG=imap_courier=debug to see each command issued.
 */
use clap::Parser;
use imap_courier::{Locator, Session};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Print a page of an IMAP mailbox")]
struct Cli {
    #[arg(env = "IMAP_USERNAME")]
    account: String,
    #[arg(env = "IMAP_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(env = "IMAP_HOST")]
    host: String,
    #[arg(env = "IMAP_PORT", default_value_t = 993)]
    port: u16,

    /// A raw locator such as `{host:993/imap/ssl}INBOX`, used instead of host and port
    #[arg(long)]
    url: Option<String>,

    /// Skip attachments with this file name (repeatable)
    #[arg(long = "reject")]
    rejects: Vec<String>,

    /// Newest message of the page, counted back from the newest in the mailbox (0)
    #[arg(long, default_value_t = 1)]
    from: u32,
    /// Oldest message of the page
    #[arg(long, default_value_t = 2)]
    to: u32,

    /// Check the server's certificate
    #[arg(long)]
    validate: bool,

    /// Fetch attachment content and report its size
    #[arg(long)]
    attachments: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let locator = match cli.url {
        Some(ref url) => Locator::parse(url)?,
        None => {
            let mut l = Locator::new(cli.host.as_str(), cli.port);
            l.set_ssl(true).set_validate(cli.validate);
            l
        }
    };

    let mut session = Session::new(cli.account.as_str(), cli.password.as_str(), locator);
    session.add_rejects(cli.rejects.iter().cloned()).set_verbose(true);

    let emails = session.try_read(cli.from, cli.to, true, cli.attachments)?;
    println!("{} of {} messages", emails.len(), session.total(false).unwrap_or(0));

    for email in emails {
        println!();
        println!("uid:     {}", email.uid);
        println!("from:    {}", email.from);
        println!("subject: {}", email.subject);
        println!("date:    {}", email.date.format("%Y-%m-%d %H:%M:%S %:z"));
        for part in &email.messages {
            println!("--- {} ---", part.number);
            println!("{}", part.text().unwrap_or_default().trim_end());
        }
        for part in &email.attachments {
            match part.data {
                Some(ref data) => println!("[{}] {} ({} bytes)", part.number, part.filename, data.len()),
                None => println!("[{}] {}", part.number, part.filename),
            }
        }
    }

    session.close();
    for e in session.take_errors() {
        eprintln!("{}", e);
    }
    Ok(())
}
