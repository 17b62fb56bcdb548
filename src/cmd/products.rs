//! Product master data commands — `qcdesk products`.

use anyhow::{Result, bail};
use console::style;

use qcdesk::api::ProductQuery;
use qcdesk::board::ProductBoard;
use qcdesk::model::{ProductForm, Role};
use qcdesk::session::{AdminTab, Preferences};
use qcdesk::ui::icons::{BOX, CHECK};
use qcdesk::ui::progress::with_spinner;
use qcdesk::ui::render;

use super::super::{Cli, ProductFields, ProductsCommands};
use super::AppContext;

fn form_from(fields: ProductFields) -> ProductForm {
    let keep = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    ProductForm {
        computer_code: keep(fields.code),
        name: keep(fields.name),
        size: keep(fields.size),
        description: keep(fields.description),
        uom: keep(fields.uom),
    }
}

/// The product listing remembered from the last `products list`.
fn listing_query(prefs: &Preferences) -> ProductQuery {
    ProductQuery {
        query: Some(prefs.products_query.clone()),
        page: prefs.products_page,
        take: prefs.products_take,
        include_inactive: prefs.products_include_inactive,
    }
}

/// Show the row for `id` if it is on the loaded page.
fn print_row(board: &ProductBoard, id: &str) {
    let rows: Vec<_> = board.products().iter().filter(|p| p.id == id).cloned().collect();
    if !rows.is_empty() {
        println!("{}", render::products(&rows));
    }
}

pub async fn cmd_products(cli: &Cli, command: ProductsCommands) -> Result<()> {
    let ctx = AppContext::load(cli)?;
    ctx.require(&[Role::Admin])?;
    let client = ctx.client()?;

    let mut prefs = ctx.store.preferences().unwrap_or_default();
    prefs.admin_tab = AdminTab::Products;

    match command {
        ProductsCommands::List {
            query,
            page,
            take,
            include_inactive,
        } => {
            // A new search starts from the first page.
            let query_changed = query.as_ref().is_some_and(|q| *q != prefs.products_query);
            if let Some(q) = query {
                prefs.products_query = q;
            }
            prefs.products_page = match page {
                Some(p) => p.max(1),
                None if query_changed => 1,
                None => prefs.products_page,
            };
            if let Some(t) = take {
                prefs.products_take = t.max(1);
            }
            if let Some(inactive) = include_inactive {
                prefs.products_include_inactive = inactive;
            }

            let mut board = ProductBoard::new(client, listing_query(&prefs));
            with_spinner("Loading products...", board.load())
                .await
                .map_err(|e| ctx.api_error(e))?;
            prefs.products_page = board.query.page;

            println!("{}", render::products(board.products()));
            let (first, last) = board.shown_range();
            println!();
            println!(
                "{}{}–{} of {}  (page {}/{})",
                BOX, first, last, board.total, board.query.page, board.pages
            );
        }
        ProductsCommands::Create { fields } => {
            let form = form_from(fields);
            if form.computer_code.is_none() || form.name.is_none() {
                bail!("--code and --name are required");
            }
            let created = with_spinner("Creating product...", client.create_product(&form))
                .await
                .map_err(|e| ctx.api_error(e))?;
            println!("{}Created {}", CHECK, style(created.label()).bold());
        }
        ProductsCommands::Update { id, fields } => {
            let form = form_from(fields);
            let updated = with_spinner("Updating product...", client.update_product(&id, &form))
                .await
                .map_err(|e| ctx.api_error(e))?;
            println!("{}Updated {}", CHECK, style(updated.label()).bold());
        }
        ProductsCommands::Deactivate { id } => {
            if !ctx.confirm(&format!("Deactivate product {}?", id)) {
                println!("Deactivate cancelled");
                return Ok(());
            }
            let mut board = ProductBoard::new(client, listing_query(&prefs));
            with_spinner("Loading products...", board.load())
                .await
                .map_err(|e| ctx.api_error(e))?;
            with_spinner("Deactivating...", board.deactivate(&id))
                .await
                .map_err(|e| ctx.api_error(e))?;
            println!("{}Product {} is inactive", CHECK, style(&id).bold());
            print_row(&board, &id);
        }
        ProductsCommands::Restore { id } => {
            let mut board = ProductBoard::new(client, listing_query(&prefs));
            with_spinner("Loading products...", board.load())
                .await
                .map_err(|e| ctx.api_error(e))?;
            with_spinner("Restoring...", board.restore(&id))
                .await
                .map_err(|e| ctx.api_error(e))?;
            println!("{}Product {} is active again", CHECK, style(&id).bold());
            print_row(&board, &id);
        }
    }

    ctx.store.save_preferences(&prefs)?;
    Ok(())
}
