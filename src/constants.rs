/// File stems of the five extracts. These match the names used by the
/// upstream export, so they are kept verbatim.
pub const CUSTOMERS_STEM: &str = "clientes";
pub const LAB_CUSTOMERS_STEM: &str = "clientes_lab";
pub const PRODUCTS_STEM: &str = "produtos";
pub const SALES_STEM: &str = "vendas";
pub const LOGISTICS_STEM: &str = "logistica";

// Suffixes appended to the stem by each stage writer
pub const PROCESSED_SUFFIX: &str = "";
pub const CORRECTED_SUFFIX: &str = "_corrigido";
pub const ENRICHED_SUFFIX: &str = "_enriquecido";

pub const CSV_EXTENSION: &str = "csv";

// Column names shared across entities
pub const COL_CUSTOMER_ID: &str = "id_cliente";
pub const COL_PRODUCT_ID: &str = "id_produto";
pub const COL_SALE_ID: &str = "id_venda";
pub const COL_DELIVERY_ID: &str = "id_entrega";

pub const COL_NAME: &str = "nome";
pub const COL_EMAIL: &str = "email";
pub const COL_PHONE: &str = "telefone";
pub const COL_BIRTH_DATE: &str = "data_nascimento";
pub const COL_REGISTERED_AT: &str = "data_cadastro";
pub const COL_CITY: &str = "cidade";
pub const COL_STATE: &str = "estado";
pub const COL_AGE: &str = "idade";
pub const COL_STATUS: &str = "status";

pub const COL_PRODUCT_NAME: &str = "nome_produto";
pub const COL_CATEGORY: &str = "categoria";
pub const COL_PRICE: &str = "preco";
pub const COL_STOCK: &str = "estoque";
pub const COL_CREATED_AT: &str = "data_criacao";
pub const COL_ACTIVE: &str = "ativo";

pub const COL_QUANTITY: &str = "quantidade";
pub const COL_UNIT_VALUE: &str = "valor_unitario";
pub const COL_TOTAL_VALUE: &str = "valor_total";
pub const COL_SOLD_AT: &str = "data_venda";

pub const COL_SHIPPED_AT: &str = "data_envio";
pub const COL_EXPECTED_DELIVERY: &str = "data_entrega_prevista";
pub const COL_DELIVERED_AT: &str = "data_entrega_real";
pub const COL_DELIVERY_STATUS: &str = "status_entrega";

// Columns added by enrichment
pub const COL_LATITUDE: &str = "latitude";
pub const COL_LONGITUDE: &str = "longitude";
pub const COL_AUTO_CATEGORY: &str = "categoria_automatica";
pub const COL_DELIVERY_DAYS: &str = "tempo_entrega_dias";
pub const COL_QUALITY_FLAG: &str = "flag_qualidade";

// Report artifacts
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";
pub const REPORT_HTML_FILE: &str = "executive_report.html";
pub const REPORT_PDF_FILE: &str = "executive_report.pdf";
pub const VALIDATION_RESULT_PREFIX: &str = "validation_result_";
pub const SUITE_SUFFIX: &str = "_suite";

/// Build the suite name used for an entity's expectations
pub fn suite_name_for(stem: &str) -> String {
    format!("{stem}{SUITE_SUFFIX}")
}

/// Map a suite name back to the file stem of the dataset it validates
pub fn stem_for_suite(suite_name: &str) -> &str {
    suite_name.strip_suffix(SUITE_SUFFIX).unwrap_or(suite_name)
}
