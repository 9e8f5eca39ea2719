use anyhow::{anyhow, Result};
use clap::Args;

use registro_domain::{MonthlySummary, Store, SummaryFilter, YearMonth};
use registro_reports::{
    currency::format_eur,
    dashboard::{filter_dashboard, user_names, DashboardFilter, Metric, MonthRange},
    savings::{savings_by_user, total_savings},
};

use crate::formatting::{print_chart, PrintFormatted};

#[derive(Args, Debug, Default)]
pub struct ShowDashboard {
    /// Full name of the user, defaults to the first one
    #[clap(short, long)]
    pub user: Option<String>,
    /// income, expenses or savings
    #[clap(short, long, default_value = "income")]
    pub metric: Metric,
    /// First month (YYYY-MM), defaults to the oldest on record
    #[clap(short, long)]
    pub from: Option<YearMonth>,
    /// Last month (YYYY-MM), defaults to the newest on record
    #[clap(short, long)]
    pub to: Option<YearMonth>,
}

impl ShowDashboard {
    /// Resolve the selection against the available rows
    pub fn filter(&self, rows: &[MonthlySummary]) -> Result<DashboardFilter> {
        let names = user_names(rows);
        let full_name = match &self.user {
            Some(name) if names.contains(name) => name.clone(),
            Some(name) => return Err(anyhow!("no monthly data for user {:?}", name)),
            None => names.first()
                .cloned()
                .ok_or_else(|| anyhow!("no users in the monthly view"))?,
        };
        let span = MonthRange::spanning(rows)
            .ok_or_else(|| anyhow!("no months in the monthly view"))?;

        Ok(DashboardFilter {
            full_name,
            metric: self.metric,
            range: MonthRange::new(
                self.from.unwrap_or(span.from()),
                self.to.unwrap_or(span.to())),
        })
    }

    /// Run the command and show the dashboard
    pub async fn run<DB: Store>(self, db: &DB) -> Result<()> {
        let rows: Vec<MonthlySummary> = db.query(&SummaryFilter::default()).await?;
        if rows.is_empty() {
            println!("No data yet to build the monthly view.");
            return Ok(());
        }

        println!("Total savings: {}", format_eur(total_savings(&rows)));
        println!("");
        savings_by_user(&rows).print_formatted();

        let filter = self.filter(&rows)?;
        println!("");
        println!("User: {}\tMetric: {}\tRange: {}", filter.full_name, filter.metric, filter.range);
        println!("");

        let view = filter_dashboard(&rows, &filter);
        if view.is_empty() {
            println!("No data in that range.");
            return Ok(());
        }
        print_chart(&view.points);
        println!("");
        view.print_formatted();

        Ok(())
    }
}
