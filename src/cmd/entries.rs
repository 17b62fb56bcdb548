//! IPQC and OQC commands — `qcdesk ipqc ...`, `qcdesk oqc ...`.

use anyhow::{Context, Result, anyhow, bail};
use console::style;

use qcdesk::api::{ApiClient, HistoryQuery};
use qcdesk::board::EntryBoard;
use qcdesk::export::{entries_csv, entries_file_name, history_file_name, write_csv};
use qcdesk::form::{IpqcQuickEntry, IpqcRowEditor, OqcQuickEntry, OqcRowEditor};
use qcdesk::history::{ActionCounts, HistoryBrowser, history_csv, page_count, page_span};
use qcdesk::model::{DailyEntry, EntryFilter, EntryKind, Product, Role};
use qcdesk::quantity::parse_raw;
use qcdesk::ui::icons::{CHECK, FILE};
use qcdesk::ui::progress::with_spinner;
use qcdesk::ui::render;

use super::super::{Cli, HistoryArgs, IpqcCommands, OqcCommands, ScopeArgs};
use super::{AppContext, export_path, print_warning};

const IPQC_ROLES: [Role; 3] = [Role::Ipqc, Role::Admin, Role::Master];
const OQC_ROLES: [Role; 3] = [Role::Oqc, Role::Admin, Role::Master];

pub async fn cmd_ipqc(cli: &Cli, command: IpqcCommands) -> Result<()> {
    let ctx = AppContext::load(cli)?;
    ctx.require(&IPQC_ROLES)?;
    let client = ctx.client()?;
    let kind = EntryKind::Ipqc;

    match command {
        IpqcCommands::Entries { scope } => show_entries(&ctx, &client, kind, &scope).await,
        IpqcCommands::Summary { scope } => {
            let filter = ctx.filter(&scope)?;
            let summary = with_spinner("Loading summary...", client.ipqc_summary(&filter))
                .await
                .map_err(|e| ctx.api_error(e))?;
            print_scope(kind, &filter);
            println!("{}", render::ipqc_summary(&summary));
            Ok(())
        }
        IpqcCommands::Previous { product, scope } => {
            let filter = ctx.filter(&scope)?;
            let product = resolve_product(&ctx, &client, &product).await?;
            let prev = client
                .previous_qty(&product.id, &filter.date, filter.shift)
                .await
                .map_err(|e| ctx.api_error(e))?;
            if !prev.found {
                println!("No earlier entry for {}.", product.label());
                return Ok(());
            }
            println!(
                "Previous entry for {}: {} {}",
                product.label(),
                prev.previous_date.as_deref().unwrap_or("?"),
                prev.previous_shift.as_deref().unwrap_or("?")
            );
            println!(
                "  before {}  after {}  on-going {}  postcured {}",
                render::qty(prev.before_ipqc),
                render::qty(prev.after_ipqc),
                render::qty(prev.on_going_postcured),
                render::qty(prev.after_postcured)
            );
            Ok(())
        }
        IpqcCommands::Submit {
            product,
            scope,
            from_previous,
            before,
            after,
            after_postcured,
            all_pass,
            no_auto_deduct,
            note,
        } => {
            let filter = ctx.filter(&scope)?;
            let product = resolve_product(&ctx, &client, &product).await?;
            let product_id = product.id.clone();

            let mut form = IpqcQuickEntry::new(ctx.config.toml.defaults.auto_deduct && !no_auto_deduct);
            form.select_product(product);
            if from_previous {
                let prev = client
                    .previous_qty(&product_id, &filter.date, filter.shift)
                    .await
                    .map_err(|e| ctx.api_error(e))?;
                if !prev.found {
                    print_warning("No earlier entry for this product; starting from zero.");
                }
                form.load_previous(&prev);
            }
            if let Some(v) = before {
                form.set_before(parse_raw(&v));
            }
            if let Some(v) = after {
                form.set_after(parse_raw(&v));
            }
            if let Some(v) = after_postcured {
                form.set_after_postcured(parse_raw(&v));
            }
            if all_pass {
                form.all_pass();
            }
            form.note = note.unwrap_or_default();

            let payload = form.payload(&filter, ctx.role())?;
            println!("{}", render::ipqc_quantities(&form.quantities()));
            let created = with_spinner("Saving entry...", client.create_entry(&payload))
                .await
                .map_err(|e| ctx.api_error(e))?;
            println!("{}Saved IPQC entry {}", CHECK, style(&created.id).bold());
            Ok(())
        }
        IpqcCommands::Edit {
            id,
            scope,
            before,
            after,
            after_postcured,
            no_auto_deduct,
            note,
        } => {
            let filter = ctx.filter(&scope)?;
            let mut board = load_board(&ctx, &client, kind, filter).await?;
            let entry = find_entry(&board, &id)?;

            let mut editor = IpqcRowEditor::new(&entry);
            editor.auto_deduct = ctx.config.toml.defaults.auto_deduct && !no_auto_deduct;
            if let Some(v) = before {
                editor.set_before(parse_raw(&v));
            }
            if let Some(v) = after {
                editor.set_after(parse_raw(&v));
            }
            if let Some(v) = after_postcured {
                editor.set_after_postcured(parse_raw(&v));
            }
            if let Some(n) = note {
                editor.note = n;
            }

            let Some(patch) = editor.patch() else {
                println!("No changes to save.");
                return Ok(());
            };
            println!("{}", render::ipqc_quantities(&editor.quantities()));
            with_spinner("Saving...", board.save_ipqc(&id, &patch))
                .await
                .map_err(|e| ctx.api_error(e))?;
            println!("{}Updated entry {}", CHECK, style(&id).bold());
            Ok(())
        }
        IpqcCommands::Delete { id, scope } => delete_entry(&ctx, &client, kind, &id, &scope).await,
        IpqcCommands::Export { scope, output } => {
            export_entries(&ctx, &client, kind, &scope, output.as_deref()).await
        }
        IpqcCommands::History(args) => show_history(&ctx, &client, kind, args).await,
    }
}

pub async fn cmd_oqc(cli: &Cli, command: OqcCommands) -> Result<()> {
    let ctx = AppContext::load(cli)?;
    ctx.require(&OQC_ROLES)?;
    let client = ctx.client()?;
    let kind = EntryKind::Oqc;

    match command {
        OqcCommands::Entries { scope } => show_entries(&ctx, &client, kind, &scope).await,
        OqcCommands::Summary { scope } => {
            let filter = ctx.filter(&scope)?;
            let summary = with_spinner("Loading summary...", client.oqc_summary(&filter))
                .await
                .map_err(|e| ctx.api_error(e))?;
            print_scope(kind, &filter);
            println!("{}", render::oqc_summary(&summary));
            Ok(())
        }
        OqcCommands::Submit {
            product,
            scope,
            source,
            after,
            hold,
            all_pass,
            note,
        } => {
            let filter = ctx.filter(&scope)?;
            let raw = |v: &Option<String>| v.as_deref().map(parse_raw).unwrap_or(0);
            let (source, after, hold) = (raw(&source), raw(&after), raw(&hold));

            let mut form = OqcQuickEntry::default();
            form.select_product(resolve_product(&ctx, &client, &product).await?);
            form.seed(source, after, hold);
            if all_pass {
                form.all_pass();
            }
            form.note = note.unwrap_or_default();

            let payload = form.payload(&filter, ctx.role())?;
            println!(
                "source {}  after {}  hold/return {}",
                render::qty(payload.before_oqc + payload.after_oqc + payload.on_hold_or_return),
                render::qty(payload.after_oqc),
                render::qty(payload.on_hold_or_return)
            );
            let created = with_spinner("Saving entry...", client.create_entry(&payload))
                .await
                .map_err(|e| ctx.api_error(e))?;
            println!("{}Saved OQC entry {}", CHECK, style(&created.id).bold());
            Ok(())
        }
        OqcCommands::Edit {
            id,
            scope,
            before,
            after,
            hold,
            note,
        } => {
            let filter = ctx.filter(&scope)?;
            let mut board = load_board(&ctx, &client, kind, filter).await?;
            let entry = find_entry(&board, &id)?;

            let mut editor = OqcRowEditor::new(&entry);
            if let Some(v) = before {
                editor.set_before(parse_raw(&v));
            }
            if let Some(v) = after {
                editor.set_after(parse_raw(&v));
            }
            if let Some(v) = hold {
                editor.set_hold_return(parse_raw(&v));
            }
            if let Some(n) = note {
                editor.note = n;
            }

            let Some(patch) = editor.patch() else {
                println!("No changes to save.");
                return Ok(());
            };
            println!("{}", render::oqc_quantities(&editor.quantities()));
            with_spinner("Saving...", board.save_oqc(&id, &patch))
                .await
                .map_err(|e| ctx.api_error(e))?;
            println!("{}Updated entry {}", CHECK, style(&id).bold());
            Ok(())
        }
        OqcCommands::Delete { id, scope } => delete_entry(&ctx, &client, kind, &id, &scope).await,
        OqcCommands::Export { scope, output } => {
            export_entries(&ctx, &client, kind, &scope, output.as_deref()).await
        }
        OqcCommands::History(args) => show_history(&ctx, &client, kind, args).await,
    }
}

fn print_scope(kind: EntryKind, filter: &EntryFilter) {
    let mut scope = format!("{} {} {}", kind.as_str(), filter.date, filter.shift);
    for part in [&filter.plant, &filter.line].into_iter().flatten() {
        scope.push_str(" · ");
        scope.push_str(part);
    }
    println!("{}", style(scope).bold());
}

/// Find a product by id or computer code. A search with a single hit is
/// taken as is.
async fn resolve_product(ctx: &AppContext, client: &ApiClient, text: &str) -> Result<Product> {
    let needle = text.trim();
    if needle.is_empty() {
        bail!(qcdesk::errors::ValidationError::MissingProduct);
    }
    let found = client
        .search_products(needle)
        .await
        .map_err(|e| ctx.api_error(e))?;

    if let Some(p) = found
        .iter()
        .find(|p| p.id == needle || p.computer_code.eq_ignore_ascii_case(needle))
    {
        return Ok(p.clone());
    }
    match found.as_slice() {
        [only] => Ok(only.clone()),
        [] => Err(anyhow!("No active product matches '{}'", needle)),
        many => {
            let labels: Vec<String> = many.iter().take(10).map(Product::label).collect();
            Err(anyhow!(
                "'{}' matches {} products; use the code or id:\n  {}",
                needle,
                many.len(),
                labels.join("\n  ")
            ))
        }
    }
}

async fn load_board(
    ctx: &AppContext,
    client: &ApiClient,
    kind: EntryKind,
    filter: EntryFilter,
) -> Result<EntryBoard> {
    let mut board = EntryBoard::new(client.clone(), kind, filter);
    with_spinner("Loading entries...", board.load())
        .await
        .map_err(|e| ctx.api_error(e))?;
    Ok(board)
}

fn find_entry(board: &EntryBoard, id: &str) -> Result<DailyEntry> {
    board
        .get(id)
        .cloned()
        .with_context(|| format!("Entry {} not found for this date/shift/plant/line", id))
}

async fn show_entries(ctx: &AppContext, client: &ApiClient, kind: EntryKind, scope: &ScopeArgs) -> Result<()> {
    let filter = ctx.filter(scope)?;
    print_scope(kind, &filter);
    let board = load_board(ctx, client, kind, filter).await?;
    println!("{}", render::entries(kind, board.entries()));
    Ok(())
}

async fn delete_entry(
    ctx: &AppContext,
    client: &ApiClient,
    kind: EntryKind,
    id: &str,
    scope: &ScopeArgs,
) -> Result<()> {
    let filter = ctx.filter(scope)?;
    let mut board = load_board(ctx, client, kind, filter).await?;
    let entry = find_entry(&board, id)?;
    println!("{}", render::entries(kind, std::slice::from_ref(&entry)));

    if !ctx.confirm("Delete this entry?") {
        println!("Delete cancelled");
        return Ok(());
    }
    with_spinner("Deleting...", board.delete(id))
        .await
        .map_err(|e| ctx.api_error(e))?;
    println!("{}Deleted entry {}", CHECK, style(id).bold());
    Ok(())
}

async fn export_entries(
    ctx: &AppContext,
    client: &ApiClient,
    kind: EntryKind,
    scope: &ScopeArgs,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let filter = ctx.filter(scope)?;
    let path = export_path(output, &entries_file_name(kind, &filter));
    let board = load_board(ctx, client, kind, filter).await?;
    write_csv(&path, &entries_csv(kind, board.entries()))?;
    println!(
        "{}Wrote {} rows to {}",
        FILE,
        board.entries().len(),
        path.display()
    );
    Ok(())
}

async fn show_history(ctx: &AppContext, client: &ApiClient, kind: EntryKind, args: HistoryArgs) -> Result<()> {
    let filter = ctx.filter(&args.scope)?;
    let mut query = HistoryQuery::new(kind, filter.clone());
    query.text = args.query.clone();
    query.only_mine = args.mine;
    query.page = args.page.max(1);
    query.take = args
        .take
        .unwrap_or(ctx.config.toml.defaults.history_take)
        .max(1);

    let mut browser = HistoryBrowser::new(client.clone(), query);
    let page = with_spinner("Loading history...", browser.load())
        .await
        .map_err(|e| ctx.api_error(e))?
        .context("History load was cancelled")?;

    print_scope(kind, &filter);
    println!("{}", render::history(kind, &page.items));

    let counts = ActionCounts::tally(&page.items);
    let (first, last) = page_span(browser.query.page, browser.query.take, page.total);
    println!();
    println!(
        "Showing {}–{} of {}  (page {}/{})   create {}  update {}  delete {}",
        if page.items.is_empty() { 0 } else { first },
        if page.items.is_empty() { 0 } else { last },
        page.total,
        browser.query.page,
        page_count(page.total, browser.query.take),
        counts.create,
        counts.update,
        counts.delete
    );

    if let Some(out) = args.export.as_deref() {
        let path = export_path(Some(out), &history_file_name(kind, &filter));
        write_csv(&path, &history_csv(kind, &page.items))?;
        println!("{}Wrote {} rows to {}", FILE, page.items.len(), path.display());
    }
    Ok(())
}
