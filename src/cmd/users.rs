//! User account commands — `qcdesk users`.

use anyhow::{Result, bail};
use console::style;

use qcdesk::board::UserBoard;
use qcdesk::model::{NewUser, Role};
use qcdesk::session::AdminTab;
use qcdesk::ui::icons::CHECK;
use qcdesk::ui::progress::with_spinner;
use qcdesk::ui::render;

use super::super::{Cli, UsersCommands};
use super::{AppContext, password_or_prompt};

pub async fn cmd_users(cli: &Cli, command: UsersCommands) -> Result<()> {
    let ctx = AppContext::load(cli)?;
    let me = ctx.require(&[Role::Admin])?.user.id.clone();
    let client = ctx.client()?;

    let mut prefs = ctx.store.preferences().unwrap_or_default();
    prefs.admin_tab = AdminTab::Users;

    match command {
        UsersCommands::List { filter } => {
            let mut board = UserBoard::new(client);
            with_spinner("Loading users...", board.load())
                .await
                .map_err(|e| ctx.api_error(e))?;
            let shown = board.filtered(filter.as_deref().unwrap_or(""));
            println!("{}", render::users(&shown));
            println!();
            println!("{} of {} users", shown.len(), board.users().len());
        }
        UsersCommands::Create {
            name,
            email,
            role,
            password,
        } => {
            let password = password_or_prompt(password, "Password for the new user")?;
            qcdesk::session::validate_login(&email, &password)?;
            if name.trim().is_empty() {
                bail!("--name must not be empty");
            }
            let user = NewUser {
                name: name.trim().to_string(),
                email: email.trim().to_string(),
                password,
                role,
            };
            let created = with_spinner("Creating user...", client.create_user(&user))
                .await
                .map_err(|e| ctx.api_error(e))?;
            println!(
                "{}Created {} <{}> as {}",
                CHECK,
                style(&created.name).bold(),
                created.email,
                created.role
            );
        }
        UsersCommands::Role { id, role } => {
            let mut board = UserBoard::new(client);
            with_spinner("Loading users...", board.load())
                .await
                .map_err(|e| ctx.api_error(e))?;
            with_spinner("Changing role...", board.change_role(&id, role))
                .await
                .map_err(|e| ctx.api_error(e))?;
            println!("{}User {} is now {}", CHECK, style(&id).bold(), role);
        }
        UsersCommands::Password { id, password } => {
            let password = password_or_prompt(password, "New password")?;
            if password.is_empty() {
                bail!("Password must not be empty");
            }
            with_spinner("Resetting password...", client.reset_password(&id, &password))
                .await
                .map_err(|e| ctx.api_error(e))?;
            println!("{}Password reset for {}", CHECK, style(&id).bold());
        }
        UsersCommands::Delete { id } => {
            if id == me {
                bail!("You cannot delete your own account");
            }
            if !ctx.confirm(&format!("Delete user {}?", id)) {
                println!("Delete cancelled");
                return Ok(());
            }
            with_spinner("Deleting user...", client.delete_user(&id))
                .await
                .map_err(|e| ctx.api_error(e))?;
            println!("{}Deleted user {}", CHECK, style(&id).bold());
        }
    }

    ctx.store.save_preferences(&prefs)?;
    Ok(())
}
