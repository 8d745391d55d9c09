use std::path::PathBuf;

use clap::{Parser, Subcommand};
use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::{Style, Term};
use longctx_core::{
    corpus::{self, Corpus},
    metrics::{format_usd, CostEfficiency},
    providers::balance,
    query::Executor,
    registry::Registry,
    ComparisonSet, QueryResult, TokenSource,
};

// ── Palette ──────────────────────────────────────────────────────────

fn s_header() -> Style { Style::new().color256(252).bold() }  // bright gray, bold
fn s_dim() -> Style    { Style::new().color256(248) }         // light gray
fn s_tree() -> Style   { Style::new().color256(245) }         // mid gray
fn s_hint() -> Style   { Style::new().color256(243) }         // soft gray
fn s_ok() -> Style     { Style::new().color256(114) }         // green
fn s_warn() -> Style   { Style::new().color256(214) }         // amber
fn s_err() -> Style    { Style::new().color256(167) }         // red
fn s_price() -> Style  { Style::new().color256(109) }         // teal
fn s_bold() -> Style   { Style::new().bold() }
fn s_label() -> Style  { Style::new().color256(146) }         // muted lavender

fn sep(width: usize) -> String {
    s_tree().apply_to("\u{2500}".repeat(width)).to_string()
}

fn fmt_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}k", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

// ── CLI Args ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "longctx",
    about = "Compare long-context document QA across LLM providers: tokens, cost, latency",
    version,
    after_help = "examples:\n  \
        longctx models\n  \
        longctx corpus documents/\n  \
        longctx ask \"Summarize the common themes\" --docs documents/\n  \
        longctx ask \"Compare attention approaches\" --models gpt-5,deepseek-chat\n  \
        longctx balance                          (DeepSeek account diagnostic)"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a models.toml overriding the bundled registry.
    #[arg(long, global = true)]
    registry: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered models with pricing and context windows.
    Models,
    /// Load a document directory and show per-document token counts.
    Corpus {
        /// Directory of PDF files.
        #[arg(default_value = "documents")]
        dir: PathBuf,
    },
    /// Ask one question across the selected models and compare the answers.
    Ask {
        question: String,
        /// Directory of PDF files forming the shared context.
        #[arg(long, default_value = "documents")]
        docs: PathBuf,
        /// Comma-separated registry ids; defaults to every registered model.
        #[arg(long, value_delimiter = ',')]
        models: Vec<String>,
        #[arg(long, short)]
        json: bool,
    },
    /// Check the DeepSeek account balance.
    Balance,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let registry = match &cli.registry {
        Some(path) => Registry::from_path(path)?,
        None => Registry::bundled()?,
    };

    match cli.command {
        Commands::Models => cmd_models(&registry),
        Commands::Corpus { dir } => cmd_corpus(&dir)?,
        Commands::Ask {
            question,
            docs,
            models,
            json,
        } => cmd_ask(registry, &question, &docs, models, json).await?,
        Commands::Balance => cmd_balance(registry).await?,
    }
    Ok(())
}

// ── Models ───────────────────────────────────────────────────────────

fn cmd_models(registry: &Registry) {
    println!();
    println!("{}", s_header().apply_to("registered models"));
    println!("{}", sep(72));

    for spec in registry.models() {
        let price = format!(
            "${:.2} in / ${:.2} out per 1M",
            spec.input_nanos_per_token as f64 / 1000.0,
            spec.output_nanos_per_token as f64 / 1000.0,
        );
        println!(
            "  {:<26} {:<22} {:<10} {}",
            s_bold().apply_to(&spec.id),
            s_label().apply_to(&spec.display_name),
            s_dim().apply_to(spec.provider.display_name()),
            s_price().apply_to(price),
        );
        println!(
            "  {:<26} {}",
            "",
            s_hint().apply_to(format!("{} token context", fmt_count(spec.context_window))),
        );
    }

    println!("{}", sep(72));
    println!(
        "{}",
        s_hint().apply_to(format!(
            "  {} models   longctx ask <question> --models <id,...>",
            registry.models().len()
        ))
    );
    println!();
}

// ── Corpus ───────────────────────────────────────────────────────────

fn load_corpus(dir: &std::path::Path) -> anyhow::Result<Corpus> {
    let term = Term::stderr();
    term.write_line(&format!("{}", s_dim().apply_to("loading documents...")))?;
    let loaded = corpus::load_dir(dir);
    term.clear_last_lines(1)?;
    Ok(loaded?)
}

fn cmd_corpus(dir: &std::path::Path) -> anyhow::Result<()> {
    let corpus = load_corpus(dir)?;

    println!();
    println!(
        "{}  {}",
        s_header().apply_to("corpus"),
        s_dim().apply_to(dir.display().to_string())
    );
    println!("{}", sep(64));

    for doc in &corpus.documents {
        println!(
            "  {:<42} {}",
            s_bold().apply_to(&doc.name),
            s_dim().apply_to(format!("{} tokens", fmt_count(doc.tokens as u64))),
        );
    }

    println!("{}", sep(64));
    println!(
        "  {} documents   {}",
        corpus.documents.len(),
        s_ok().apply_to(format!("{} total tokens", fmt_count(corpus.total_tokens as u64))),
    );
    println!();
    Ok(())
}

// ── Ask ──────────────────────────────────────────────────────────────

async fn cmd_ask(
    registry: Registry,
    question: &str,
    docs: &std::path::Path,
    models: Vec<String>,
    json: bool,
) -> anyhow::Result<()> {
    let corpus = load_corpus(docs)?;

    let ids: Vec<String> = if models.is_empty() {
        registry.ids().into_iter().map(String::from).collect()
    } else {
        models
    };

    let exec = Executor::new(registry);
    let term = Term::stderr();
    if !json {
        term.write_line(&format!(
            "{}",
            s_dim().apply_to(format!(
                "querying {} models over {} context tokens...",
                ids.len(),
                fmt_count(corpus.total_tokens as u64)
            ))
        ))?;
    }

    let set = exec.run(&corpus, question, &ids).await?;
    if !json {
        term.clear_last_lines(1)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&set)?);
        return Ok(());
    }

    let now = chrono::Local::now().format("%H:%M:%S");
    println!();
    println!(
        "{}  {}",
        s_header().apply_to(question),
        s_dim().apply_to(now)
    );

    print_panels(&set);
    print_metrics_table(&set);
    print_charts(&set);
    print_verdict(&set);
    Ok(())
}

fn print_panels(set: &ComparisonSet) {
    for result in &set.results {
        println!("{}", sep(72));
        match &result.outcome {
            Ok(answer) => {
                println!(
                    "  {}  {}",
                    s_bold().apply_to(&result.model_name),
                    s_dim().apply_to(format!("{:.1}s", result.latency_s)),
                );
                println!();
                for line in answer.text.trim().lines() {
                    println!("  {line}");
                }
            }
            Err(e) => {
                println!(
                    "  {}  {}",
                    s_bold().apply_to(&result.model_name),
                    s_err().apply_to("\u{2717} failed"),
                );
                println!();
                println!("  {}", s_err().apply_to(e.to_string()));
            }
        }
        println!();
    }
}

fn print_metrics_table(set: &ComparisonSet) {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "model", "in", "out", "latency", "cost", "cost/s", "tokens",
        ]);

    for result in &set.results {
        match &result.outcome {
            Ok(answer) => {
                let eff = match CostEfficiency::compute(answer.cost_nanos, result.latency_s) {
                    CostEfficiency::DollarsPerSecond(v) => format!("${v:.4}/s"),
                    CostEfficiency::Undefined => "undefined".to_string(),
                };
                let source = match answer.token_source {
                    TokenSource::Reported => "reported",
                    TokenSource::Estimated => "estimated",
                };
                table.add_row(vec![
                    Cell::new(&result.model_name),
                    Cell::new(fmt_count(answer.input_tokens)).set_alignment(CellAlignment::Right),
                    Cell::new(fmt_count(answer.output_tokens)).set_alignment(CellAlignment::Right),
                    Cell::new(format!("{:.1}s", result.latency_s))
                        .set_alignment(CellAlignment::Right),
                    Cell::new(format_usd(answer.cost_nanos)).set_alignment(CellAlignment::Right),
                    Cell::new(eff).set_alignment(CellAlignment::Right),
                    Cell::new(source),
                ]);
            }
            Err(_) => {
                table.add_row(vec![
                    Cell::new(&result.model_name),
                    Cell::new("\u{2500}"),
                    Cell::new("\u{2500}"),
                    Cell::new(format!("{:.1}s", result.latency_s))
                        .set_alignment(CellAlignment::Right),
                    Cell::new("\u{2500}"),
                    Cell::new("\u{2500}"),
                    Cell::new("failed"),
                ]);
            }
        }
    }

    println!("{table}");
}

// ── Charts ───────────────────────────────────────────────────────────

const BAR_WIDTH: usize = 36;

fn bar(fraction: f64, width: usize) -> String {
    let filled = (fraction * width as f64).round() as usize;
    "\u{2588}".repeat(filled.min(width))
}

/// Horizontal bar chart over the successful results only.
fn chart(title: &str, rows: Vec<(String, f64, String)>) {
    let max = rows.iter().map(|(_, v, _)| *v).fold(0.0_f64, f64::max);
    if rows.is_empty() || max <= 0.0 {
        return;
    }

    println!();
    println!("  {}", s_header().apply_to(title));
    for (label, value, formatted) in rows {
        println!(
            "  {:<24} {} {}",
            s_label().apply_to(label),
            s_price().apply_to(bar(value / max, BAR_WIDTH)),
            s_dim().apply_to(formatted),
        );
    }
}

fn print_charts(set: &ComparisonSet) {
    let ok: Vec<&QueryResult> = set.succeeded().collect();
    if ok.is_empty() {
        println!("{}", s_warn().apply_to("  no successful queries to chart"));
        return;
    }

    chart(
        "cost by model",
        ok.iter()
            .map(|r| {
                let a = r.answer().expect("succeeded() yields answered results");
                (
                    r.model_name.clone(),
                    a.cost_nanos as f64,
                    format_usd(a.cost_nanos),
                )
            })
            .collect(),
    );

    chart(
        "latency by model",
        ok.iter()
            .map(|r| {
                (
                    r.model_name.clone(),
                    r.latency_s,
                    format!("{:.1}s", r.latency_s),
                )
            })
            .collect(),
    );

    print_token_chart(&ok);
    print_scatter(&ok);

    let failures: Vec<&str> = set.failed().map(|r| r.model_name.as_str()).collect();
    if !failures.is_empty() {
        println!();
        println!(
            "  {}",
            s_warn().apply_to(format!("excluded from charts: {}", failures.join(", ")))
        );
    }
    println!();
}

/// Stacked input/output token bars.
fn print_token_chart(ok: &[&QueryResult]) {
    let max = ok
        .iter()
        .filter_map(|r| r.total_tokens())
        .max()
        .unwrap_or(0);
    if max == 0 {
        return;
    }

    println!();
    println!("  {}", s_header().apply_to("token breakdown by model"));
    for r in ok {
        let a = r.answer().expect("succeeded() yields answered results");
        let scale = BAR_WIDTH as f64 / max as f64;
        let in_w = (a.input_tokens as f64 * scale).round() as usize;
        let out_w = ((a.output_tokens as f64 * scale).round() as usize).max(1);
        println!(
            "  {:<24} {}{} {}",
            s_label().apply_to(&r.model_name),
            s_price().apply_to("\u{2588}".repeat(in_w)),
            s_warn().apply_to("\u{2593}".repeat(out_w)),
            s_dim().apply_to(format!(
                "{} in / {} out",
                fmt_count(a.input_tokens),
                fmt_count(a.output_tokens)
            )),
        );
    }
    println!(
        "  {:<24} {}",
        "",
        s_hint().apply_to("\u{2588} input   \u{2593} output"),
    );
}

const SCATTER_W: usize = 44;
const SCATTER_H: usize = 10;

/// Cost-vs-latency scatter: x is latency, y is cost, one numbered marker
/// per model. Cheap-and-fast sits bottom-left.
fn print_scatter(ok: &[&QueryResult]) {
    let max_cost = ok
        .iter()
        .filter_map(|r| r.cost_nanos())
        .fold(0_i64, i64::max);
    let max_latency = ok.iter().map(|r| r.latency_s).fold(0.0_f64, f64::max);
    if max_cost <= 0 || max_latency <= 0.0 {
        return;
    }

    let mut grid = vec![vec![' '; SCATTER_W]; SCATTER_H];
    for (i, r) in ok.iter().enumerate() {
        let a = r.answer().expect("succeeded() yields answered results");
        let x = ((r.latency_s / max_latency) * (SCATTER_W - 1) as f64).round() as usize;
        let y = ((a.cost_nanos as f64 / max_cost as f64) * (SCATTER_H - 1) as f64).round() as usize;
        let row = SCATTER_H - 1 - y;
        let marker = char::from_digit((i + 1) as u32 % 36, 36).unwrap_or('?');
        grid[row][x.min(SCATTER_W - 1)] = marker;
    }

    println!();
    println!("  {}", s_header().apply_to("cost vs latency"));
    for (i, row) in grid.iter().enumerate() {
        let axis = if i == 0 {
            format!("{:>9} ", format_usd(max_cost))
        } else {
            format!("{:>9} ", "")
        };
        let line: String = row.iter().collect();
        println!(
            "  {}{}{}",
            s_hint().apply_to(axis),
            s_tree().apply_to("\u{2502}"),
            line
        );
    }
    println!(
        "  {:>9} {}{}",
        "",
        s_tree().apply_to("\u{2514}"),
        s_tree().apply_to("\u{2500}".repeat(SCATTER_W)),
    );
    println!(
        "  {:>10} {}",
        "",
        s_hint().apply_to(format!("0s \u{2192} {max_latency:.1}s")),
    );
    for (i, r) in ok.iter().enumerate() {
        let marker = char::from_digit((i + 1) as u32 % 36, 36).unwrap_or('?');
        println!(
            "  {:>10} {}",
            "",
            s_hint().apply_to(format!("{marker} = {}", r.model_name)),
        );
    }
}

fn print_verdict(set: &ComparisonSet) {
    if let (Some(cheapest), Some(fastest)) = (set.cheapest(), set.fastest()) {
        println!(
            "  {} {}   {} {}",
            s_hint().apply_to("cheapest:"),
            s_ok().apply_to(&cheapest.model_name),
            s_hint().apply_to("fastest:"),
            s_ok().apply_to(&fastest.model_name),
        );
        println!(
            "  {} {}",
            s_hint().apply_to("total spent:"),
            s_price().apply_to(format_usd(set.total_cost_nanos())),
        );
        println!();
    }
}

// ── Balance ──────────────────────────────────────────────────────────

async fn cmd_balance(registry: Registry) -> anyhow::Result<()> {
    let exec = Executor::new(registry);
    let term = Term::stderr();
    term.write_line(&format!("{}", s_dim().apply_to("checking balance...")))?;
    let report = balance::deepseek_balance(exec.http()).await?;
    term.clear_last_lines(1)?;

    println!();
    match report {
        Some(report) => {
            for entry in &report.balance_infos {
                let amount: f64 = entry.total_balance.parse().unwrap_or(0.0);
                if report.is_available && amount > 0.0 {
                    println!(
                        "  {} {} {}",
                        s_ok().apply_to("\u{25cf}"),
                        s_bold().apply_to(format!("{} {}", entry.total_balance, entry.currency)),
                        s_dim().apply_to("available"),
                    );
                } else {
                    println!(
                        "  {} {} {}",
                        s_err().apply_to("\u{2717}"),
                        s_bold().apply_to(format!("{} {}", entry.total_balance, entry.currency)),
                        s_err().apply_to("insufficient"),
                    );
                    println!(
                        "  {}",
                        s_hint().apply_to("add credits at https://platform.deepseek.com"),
                    );
                }
            }
            if report.balance_infos.is_empty() {
                println!("{}", s_warn().apply_to("  no balance entries returned"));
            }
        }
        None => {
            println!(
                "{}",
                s_warn().apply_to("  could not check balance (is $DEEPSEEK_API_KEY set?)")
            );
        }
    }
    println!();
    Ok(())
}
