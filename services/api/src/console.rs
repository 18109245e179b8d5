use crate::infra::build_engine;
use clap::Args;
use std::fmt::Write;
use std::path::PathBuf;
use strategy_agent::config::AppConfig;
use strategy_agent::error::AppError;
use strategy_agent::telemetry;
use strategy_agent::workflows::catalogue::{CustomerId, Dataset};
use strategy_agent::workflows::recommendation::{
    classify, Decision, FileReportStore, ItemRecommendations, RecommendationReport,
    ReportRepository, ReportStoreError,
};

const RULE: &str =
    "================================================================================";

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Customer to analyse (case-insensitive)
    #[arg(long)]
    pub(crate) customer_id: String,
    /// Directory holding the customer, catalogue, product, sales and store tables
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Directory the JSON report is written to
    #[arg(long)]
    pub(crate) report_dir: Option<PathBuf>,
    /// Skip upsell evaluation for this run
    #[arg(long)]
    pub(crate) no_upsell: bool,
    /// Print the report as JSON instead of the text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CustomersArgs {
    /// Directory holding the customer, catalogue, product, sales and store tables
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

pub(crate) async fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let data_dir = args.data_dir.unwrap_or_else(|| config.data.dir.clone());
    let report_dir = args
        .report_dir
        .unwrap_or_else(|| config.output.report_dir.clone());
    let mut pipeline = config.pipeline.clone();
    if args.no_upsell {
        pipeline.upsell_enabled = false;
    }

    let customer_id = CustomerId::normalized(&args.customer_id);
    if customer_id.as_str().is_empty() {
        return Err(AppError::BadRequest("customer id is required".to_string()));
    }

    let engine = build_engine(&config, &data_dir, pipeline).await?;
    let report = engine.run(&customer_id).await?;
    let stored = FileReportStore::new(report_dir).save(&report)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).map_err(ReportStoreError::from)?;
        println!("{json}");
    } else {
        print!("{}", render_report(&report));
        println!("\nReport saved to {}", stored.location);
    }
    Ok(())
}

pub(crate) fn run_customers(args: CustomersArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let data_dir = args.data_dir.unwrap_or(config.data.dir);
    let dataset = Dataset::from_dir(&data_dir)?;
    print!("{}", render_customers(&dataset));
    Ok(())
}

pub(crate) fn render_customers(dataset: &Dataset) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Customers ({})", dataset.customers().len());
    for customer in dataset.customers() {
        let history = dataset.purchase_history(&customer.id);
        let classification = classify(history.total_quantity(), dataset.store_count(&customer.id));
        let _ = writeln!(
            out,
            "- {} | {} | {} | {} catalogue items",
            customer.id,
            customer.name,
            classification.customer_type.label(),
            dataset.catalogue_for(&customer.id).count()
        );
    }
    out
}

/// Plain-text rendering of a report for terminals.
pub(crate) fn render_report(report: &RecommendationReport) -> String {
    let mut out = String::new();
    let classification = &report.classification;

    let _ = writeln!(out, "Customer: {} ({})", report.customer.customer_name, report.customer.customer_id);
    let _ = writeln!(
        out,
        "Customer Type: {} ({})",
        classification.customer_type.label(),
        classification.customer_type.scale()
    );
    let _ = writeln!(out, "Total Quantity Sold: {}", classification.total_quantity_sold);
    let _ = writeln!(out, "Number of Stores: {}", classification.number_of_stores);

    section(&mut out, "RECOMMENDATION REPORT");
    if report.accepted.is_empty() {
        let _ = writeln!(out, "No recommendations found");
    }
    for entry in &report.accepted {
        item_header(&mut out, entry);
        match &entry.up_sell {
            Some(upsell) => {
                let _ = writeln!(out, "   Up-Sell: {} -> {} units", upsell.product_id, upsell.recommended_quantity);
                let _ = writeln!(out, "      Currently Sold: {}", upsell.quantity_sold);
                let _ = writeln!(out, "      Estimated Revenue: ${:.2}", upsell.estimated_revenue);
                let _ = writeln!(out, "      Reasoning: {}", upsell.reasoning);
            }
            None => {
                let _ = writeln!(out, "   No up-sell opportunities");
            }
        }
        decisions(&mut out, "Cross-Sell Opportunities", &entry.cross_sell);
    }

    if !report.rejected.is_empty() {
        section(&mut out, "REJECTED RECOMMENDATIONS");
        for entry in &report.rejected {
            item_header(&mut out, entry);
            decisions(&mut out, "Rejected Cross-Sell Opportunities", &entry.cross_sell);
        }
    }

    if !report.already_purchased.is_empty() {
        section(&mut out, "ALREADY PURCHASED RECOMMENDATIONS");
        for entry in &report.already_purchased {
            item_header(&mut out, entry);
            decisions(
                &mut out,
                "Already Purchased Cross-Sell Opportunities",
                &entry.cross_sell,
            );
        }
    }

    if !report.failures.is_empty() {
        section(&mut out, "FAILED ITEMS");
        for failure in &report.failures {
            let _ = writeln!(
                out,
                "- {} ({}) during {}: {}",
                failure.product_name,
                failure.catalogue_item_id,
                failure.stage.label(),
                failure.error
            );
        }
    }

    let summary = report.summary;
    section(&mut out, "SUMMARY");
    let _ = writeln!(out, "Total Up-Sell Opportunities: {}", summary.total_up_sell);
    if summary.total_up_sell > 0 {
        let _ = writeln!(
            out,
            "Estimated Up-Sell Revenue: ${:.2}",
            report.estimated_upsell_revenue()
        );
    }
    let _ = writeln!(out, "Total Cross-Sell Opportunities: {}", summary.total_cross_sell);
    let _ = writeln!(out, "Total Rejected Opportunities: {}", summary.total_rejected);
    let _ = writeln!(out, "Total Already Purchased: {}", summary.total_already_purchased);
    let _ = writeln!(out, "Total Recommendations: {}", summary.total_recommendations);
    if summary.total_failed_items > 0 {
        let _ = writeln!(out, "Failed Items: {}", summary.total_failed_items);
    }
    let _ = writeln!(out, "Generated At: {}", report.generated_at.to_rfc3339());
    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{RULE}\n{title}\n{RULE}");
}

fn item_header(out: &mut String, entry: &ItemRecommendations) {
    let _ = writeln!(out, "\nCatalogue Item: {}", entry.product_name);
    let _ = writeln!(out, "   ID: {}", entry.catalogue_item_id);
    let _ = writeln!(out, "   Required Quantity: {}", entry.quantity_required);
}

fn decisions(out: &mut String, heading: &str, decisions: &[Decision]) {
    if decisions.is_empty() {
        return;
    }
    let _ = writeln!(out, "   {heading} ({}):", decisions.len());
    for decision in decisions {
        let candidate = &decision.candidate;
        let _ = writeln!(out, "      * {} -> {}", candidate.ingredient, candidate.suggested_product);
        let _ = writeln!(out, "        Product ID: {}", candidate.product_id);
        let _ = writeln!(
            out,
            "        Category: {}",
            candidate.category.as_deref().unwrap_or("Unknown")
        );
        match candidate.price {
            Some(price) => {
                let _ = writeln!(out, "        Price: ${price:.2}");
            }
            None => {
                let _ = writeln!(out, "        Price: not on file");
            }
        }
        let _ = writeln!(out, "        Similarity Score: {:.3}", candidate.similarity_score);
        let _ = writeln!(out, "        AI Reasoning: {}", decision.ai_reasoning);
    }
}
