//! HTML executive report
//!
//! Handlebars-based rendering of per-dataset metrics and links to the
//! validation artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use handlebars::Handlebars;
use serde::Serialize;

use crate::error::Result;
use crate::pipeline::processing::metrics::DatasetMetrics;

const REPORT_TEMPLATE_NAME: &str = "executive_report";

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Relatorio Executivo - Qualidade de Dados</title>
<style>body{font-family:Arial,sans-serif;margin:40px;color:#333;}h1{color:#2c3e50;}h2{color:#34495e;}table{border-collapse:collapse;width:100%;margin:10px 0;}th,td{border:1px solid #ddd;padding:8px;text-align:left;}th{background:#f2f2f2;}.ok{color:#27ae60;}.fail{color:#c0392b;}</style>
</head>
<body>
<h1>Relatorio Executivo - Qualidade de Dados</h1>
<p>Gerado em: {{generated_at}}</p>

<h2>Resumo Geral</h2>
<table>
<tr><th>Dataset</th><th>Arquivo</th><th>Registros</th><th>Colunas</th><th>Duplicatas</th><th>Clientes unicos</th><th>Preco min</th><th>Preco max</th></tr>
{{#each datasets}}<tr><td>{{dataset}}</td><td>{{file}}</td><td>{{rows}}</td><td>{{columns}}</td><td>{{duplicates}}</td><td>{{#if unique_customers includeZero=true}}{{unique_customers}}{{else}}-{{/if}}</td><td>{{#if price_min includeZero=true}}{{price_min}}{{else}}-{{/if}}</td><td>{{#if price_max includeZero=true}}{{price_max}}{{else}}-{{/if}}</td></tr>
{{/each}}</table>

<h2>Valores nulos por coluna</h2>
{{#each datasets}}<h3>{{dataset}}</h3>
<table>
<tr><th>Coluna</th><th>Nulos</th></tr>
{{#each nulls_per_column}}<tr><td>{{@key}}</td><td>{{this}}</td></tr>
{{/each}}</table>
{{/each}}

<h2>Validacoes</h2>
{{#if validations}}<table>
<tr><th>Suite</th><th>Status</th><th>Expectativas</th><th>Falhas</th><th>Artefato</th></tr>
{{#each validations}}<tr><td>{{suite_name}}</td><td class="{{#if success}}ok{{else}}fail{{/if}}">{{#if success}}APROVADO{{else}}REPROVADO{{/if}}</td><td>{{evaluated}}</td><td>{{failed}}</td><td><a href="{{artifact}}">{{artifact}}</a></td></tr>
{{/each}}</table>
{{else}}<p>Nenhum resultado de validacao encontrado.</p>
{{/if}}
</body>
</html>
"#;

/// Pass/fail line for one validation artifact
#[derive(Debug, Clone, Serialize)]
pub struct ValidationLink {
    pub suite_name: String,
    pub success: bool,
    pub evaluated: usize,
    pub failed: usize,
    /// Artifact file name, relative to the report
    pub artifact: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportContext {
    pub generated_at: DateTime<Utc>,
    pub datasets: Vec<DatasetMetrics>,
    pub validations: Vec<ValidationLink>,
}

pub struct HtmlReportRenderer {
    handlebars: Handlebars<'static>,
}

impl HtmlReportRenderer {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_template_string(REPORT_TEMPLATE_NAME, REPORT_TEMPLATE)?;
        Ok(Self { handlebars })
    }

    pub fn render(&self, context: &ReportContext) -> Result<String> {
        Ok(self.handlebars.render(REPORT_TEMPLATE_NAME, context)?)
    }

    /// Render and write the report to `dir/file_name`
    pub fn write(&self, context: &ReportContext, dir: &Path, file_name: &str) -> Result<PathBuf> {
        let html = self.render(context)?;
        fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        fs::write(&path, html)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn context() -> ReportContext {
        let mut nulls = BTreeMap::new();
        nulls.insert("email".to_string(), 2);
        ReportContext {
            generated_at: Utc::now(),
            datasets: vec![DatasetMetrics {
                dataset: "clientes".to_string(),
                file: "clientes_corrigido.csv".to_string(),
                rows: 3,
                columns: 1,
                column_names: vec!["email".to_string()],
                nulls_per_column: nulls,
                duplicates: 0,
                unique_customers: Some(3),
                price_min: None,
                price_max: None,
            }],
            validations: vec![ValidationLink {
                suite_name: "clientes_suite".to_string(),
                success: false,
                evaluated: 7,
                failed: 1,
                artifact: "validation_result_clientes_suite.json".to_string(),
            }],
        }
    }

    #[test]
    fn report_lists_metrics_and_validation_links() {
        let html = HtmlReportRenderer::new().unwrap().render(&context()).unwrap();

        assert!(html.contains("<td>clientes_corrigido.csv</td>"));
        assert!(html.contains("<td>email</td><td>2</td>"));
        assert!(html.contains("href=\"validation_result_clientes_suite.json\""));
        assert!(html.contains("REPROVADO"));
    }

    #[test]
    fn report_without_validations_says_so() {
        let mut ctx = context();
        ctx.validations.clear();
        let html = HtmlReportRenderer::new().unwrap().render(&ctx).unwrap();
        assert!(html.contains("Nenhum resultado de validacao encontrado."));
    }
}
