//! Operator-facing terminal output with colored badges.
//! Token output goes to stdout; diagnostics go to stderr.

use chrono::SecondsFormat;
use colored::Colorize;

use crate::error::Error;
use crate::issuer::IssuedToken;
use crate::token::claims::Claims;

const USAGE: &str = "issue-token <email> <password>";
const EXAMPLE_ENDPOINT: &str = "/api/transactions";

// === Badges ===

fn badge(text: &str, fg: colored::Color, bg: colored::Color) -> colored::ColoredString {
    format!(" {} ", text).color(fg).on_color(bg).bold()
}

// === Success ===

pub fn print_issued(issued: &IssuedToken, api_url: &str) {
    println!(
        "{} {}",
        badge("OK", colored::Color::Black, colored::Color::Green),
        "JWT token generated successfully!".white().bold()
    );
    println!();
    println!("{}", "Token Details:".white().bold());
    println!(
        "  {} {} {}",
        "User:".dimmed(),
        issued.email.white(),
        format!("(ID: {})", issued.account_id).dimmed()
    );
    println!(
        "  {} {}",
        "Expires:".dimmed(),
        issued
            .expires_at
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .cyan()
    );
    println!();
    println!("{}", "JWT Token:".white().bold());
    println!("{}", issued.token);
    println!();
    println!("{}", "Usage Example:".white().bold());
    println!("{}", usage_example(&issued.token, api_url));
}

pub fn usage_example(token: &str, api_url: &str) -> String {
    format!(
        "curl -H \"Authorization: Bearer {}\" \\\n  {}{}",
        token,
        api_url.trim_end_matches('/'),
        EXAMPLE_ENDPOINT
    )
}

pub fn print_claims(claims: &Claims) {
    println!(
        "{} {}",
        badge("VALID", colored::Color::Black, colored::Color::Blue),
        "signature and expiry verified".white()
    );
    println!("  {} {}", "sub:".dimmed(), claims.sub.white());
    println!("  {} {}", "email:".dimmed(), claims.email.white());
    println!("  {} {}", "name:".dimmed(), claims.name.white());
    println!("  {} {}", "jti:".dimmed(), claims.jti.dimmed());
    if let Some(exp) = claims.expires_at() {
        println!(
            "  {} {}",
            "expires:".dimmed(),
            exp.to_rfc3339_opts(SecondsFormat::Secs, true).cyan()
        );
    }
}

pub fn print_hash(hash: &str) {
    println!("{}", hash);
}

// === Failure ===

pub fn print_error(err: &Error) {
    eprintln!(
        "{} {} {}",
        badge("ERROR", colored::Color::White, colored::Color::Red),
        format!("{}:", err.kind()).red().bold(),
        err.to_string().red()
    );
    if matches!(err, Error::MissingInput(_)) {
        eprintln!("{} {}", "Usage:".dimmed(), USAGE);
    }
}
