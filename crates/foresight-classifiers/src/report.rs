//! HTML training report written alongside each run's artifacts.
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::common::Mode;
use plotly::{Plot, Scatter};

use crate::config::TrainerConfig;
use crate::stats::EvaluationMetrics;

/// Summary of one training run, rendered to a standalone HTML page.
pub struct TrainingReport<'a> {
    strategy: &'a str,
    modelid: &'a str,
    runid: i64,
    metrics: &'a EvaluationMetrics,
    losses: &'a [f32],
}

impl<'a> TrainingReport<'a> {
    pub fn new(
        strategy: &'a str,
        modelid: &'a str,
        runid: i64,
        metrics: &'a EvaluationMetrics,
        losses: &'a [f32],
    ) -> Self {
        TrainingReport {
            strategy,
            modelid,
            runid,
            metrics,
            losses,
        }
    }

    pub fn save(&self, path: &Path, config: &TrainerConfig) -> Result<()> {
        let page = self.render(config)?;
        std::fs::write(path, page.into_string())
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    fn render(&self, config: &TrainerConfig) -> Result<Markup> {
        let config_json =
            serde_json::to_string_pretty(config).context("Failed to serialize config")?;
        let loss_plot = self.loss_plot();
        let generated = Utc::now().to_rfc3339();

        Ok(html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { "Foresight Trainer Report" }
                    style {
                        "body { font-family: sans-serif; margin: 2em; }
                         table { border-collapse: collapse; }
                         td, th { border: 1px solid #ccc; padding: 6px 12px; text-align: left; }
                         .code-container {
                             background-color: #f5f5f5;
                             padding: 10px;
                             border-radius: 5px;
                             overflow-x: auto;
                             font-family: monospace;
                             white-space: pre-wrap;
                         }"
                    }
                }
                body {
                    h1 { "Foresight " (self.strategy) " Trainer Report" }
                    p {
                        "Model " b { (self.modelid) } ", run " (self.runid)
                        ", generated " (generated) "."
                    }

                    h2 { "Overview" }
                    p {
                        "This report summarizes one training run: held-out evaluation \
                         metrics and the loss trajectory over training epochs. The loss \
                         curve gives insight into convergence behavior and training \
                         stability."
                    }
                    table {
                        tr { th { "Metric" } th { "Value" } }
                        tr { td { "Accuracy" }  td { (format!("{:.4}", self.metrics.accuracy)) } }
                        tr { td { "Precision" } td { (format!("{:.4}", self.metrics.precision)) } }
                        tr { td { "Recall" }    td { (format!("{:.4}", self.metrics.recall)) } }
                        tr { td { "F1 score" }  td { (format!("{:.4}", self.metrics.f1_score)) } }
                        tr { td { "AUC" }       td { (format!("{:.4}", self.metrics.auc)) } }
                    }
                    @if let Some(plot_html) = loss_plot {
                        h2 { "Training loss" }
                        (PreEscaped(plot_html))
                    }

                    h2 { "Configuration" }
                    div class="code-container" {
                        pre {
                            code { (PreEscaped(config_json)) }
                        }
                    }
                }
            }
        })
    }

    fn loss_plot(&self) -> Option<String> {
        if self.losses.is_empty() {
            return None;
        }
        let epochs: Vec<f64> = (1..=self.losses.len()).map(|e| e as f64).collect();
        let losses: Vec<f64> = self.losses.iter().map(|&l| l as f64).collect();
        let trace = Scatter::new(epochs, losses).mode(Mode::Lines).name("loss");
        let mut plot = Plot::new();
        plot.add_trace(trace);
        Some(plot.to_inline_html(Some("loss-plot")))
    }
}
