//! Admin dashboards — `qcdesk admin overview`, `qcdesk admin totals`.

use anyhow::Result;
use console::style;

use qcdesk::api::AggregateQuery;
use qcdesk::export::{totals_csv, totals_file_name, write_csv};
use qcdesk::model::{Role, today};
use qcdesk::session::AdminTab;
use qcdesk::ui::icons::{CHART, FILE};
use qcdesk::ui::progress::with_spinner;
use qcdesk::ui::render;

use super::super::{AdminCommands, Cli};
use super::{AppContext, check_date, export_path};

pub async fn cmd_admin(cli: &Cli, command: AdminCommands) -> Result<()> {
    let ctx = AppContext::load(cli)?;
    ctx.require(&[Role::Admin])?;
    let client = ctx.client()?;
    let mut prefs = ctx.store.preferences().unwrap_or_default();

    match command {
        AdminCommands::Overview { kind, take } => {
            prefs.admin_tab = AdminTab::Overview;
            let kind = kind.unwrap_or(prefs.overview_kind);
            prefs.overview_kind = kind;

            let overview = with_spinner("Loading overview...", client.admin_overview(take))
                .await
                .map_err(|e| ctx.api_error(e))?;
            println!("{}{}", CHART, style("Overview").bold());
            println!("{}", render::overview(&overview, kind));
        }
        AdminCommands::Totals {
            from,
            to,
            plant,
            line,
            query,
            order,
            take,
            export,
        } => {
            prefs.admin_tab = AdminTab::Totals;
            let query = AggregateQuery {
                date_from: from.as_deref().map(check_date).transpose()?,
                date_to: to.as_deref().map(check_date).transpose()?,
                plant,
                line,
                text: query,
                order,
                take: take.max(1),
            };

            let agg = with_spinner("Loading totals...", client.aggregate_by_product(&query))
                .await
                .map_err(|e| ctx.api_error(e))?;
            println!("{}", render::totals(&agg));
            println!();
            println!("{} of {} products", agg.items.len(), agg.total_products);

            if let Some(out) = export.as_deref() {
                let path = export_path(Some(out), &totals_file_name(&today()));
                write_csv(&path, &totals_csv(&agg.items))?;
                println!("{}Wrote {} rows to {}", FILE, agg.items.len(), path.display());
            }
        }
    }

    ctx.store.save_preferences(&prefs)?;
    Ok(())
}
