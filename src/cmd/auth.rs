//! Session commands — `qcdesk login`, `logout`, `whoami`.

use anyhow::{Context, Result};
use console::style;

use qcdesk::session::{Session, validate_login};
use qcdesk::ui::Spinner;
use qcdesk::ui::icons::{CHECK, USER};

use super::super::Cli;
use super::{AppContext, password_or_prompt};

pub async fn cmd_login(cli: &Cli, email: Option<String>, password: Option<String>) -> Result<()> {
    let ctx = AppContext::load(cli)?;

    let email = match email {
        Some(e) => e,
        None => dialoguer::Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .context("Failed to read email")?,
    };
    let password = password_or_prompt(password, "Password")?;
    validate_login(&email, &password)?;

    // Login never carries a stale token.
    let client = ctx.config.client(None)?;
    let spinner = Spinner::start("Logging in...");
    let resp = match client.login(email.trim(), &password).await {
        Ok(resp) => resp,
        Err(e) => {
            spinner.fail("Login failed");
            return Err(e).context("Login failed");
        }
    };
    spinner.clear();

    let session = Session {
        token: resp.token,
        user: resp.user,
    };
    ctx.store.save(&session)?;

    println!(
        "{}Logged in as {} ({})",
        CHECK,
        style(&session.user.name).bold(),
        style(session.user.role).cyan()
    );
    println!("Home: {}", session.user.role.home());
    Ok(())
}

pub fn cmd_logout(cli: &Cli) -> Result<()> {
    let ctx = AppContext::load(cli)?;
    ctx.store.clear()?;
    println!("Logged out");
    Ok(())
}

pub fn cmd_whoami(cli: &Cli) -> Result<()> {
    let ctx = AppContext::load(cli)?;
    let session = ctx.session.as_ref().ok_or(qcdesk::errors::SessionError::NotLoggedIn)?;
    let user = &session.user;
    println!("{}{} <{}>", USER, style(&user.name).bold(), user.email);
    println!("  role: {}", user.role);
    println!("  id:   {}", user.id);
    println!("  api:  {}", ctx.config.base_url());
    Ok(())
}
