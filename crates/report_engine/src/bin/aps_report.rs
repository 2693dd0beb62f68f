//! Batch driver: ingest a set of e-SUS report spreadsheets and print the
//! consolidated management report as JSON.

use anyhow::{Context, bail};
use report_engine::analysis::care_mix;
use report_engine::analysis::production::{self, FacilityProduction, ProductionFilter};
use report_engine::analysis::summary::{self, OverviewKpis};
use report_engine::analysis::{AnalysisContext, RankedEntry};
use report_engine::ingest::{IngestResult, ingest_paths};
use report_engine::table::ReportTable;
use serde::Serialize;
use shared::models::registry::ParameterRegistry;

const TOP_RANKED: usize = 5;
const TOP_TABLE_ROWS: usize = 15;

#[derive(Serialize)]
struct Report {
    municipio: String,
    uf: String,
    arquivos: Vec<String>,
    nao_reconhecidos: Vec<String>,
    cadastros: Option<CitizenSection>,
    domicilios: Option<HouseholdSection>,
    producao: Option<ProductionSection>,
}

#[derive(Serialize)]
struct CitizenSection {
    indicadores: OverviewKpis,
    equipes: ReportTable,
    documentos: ReportTable,
    atualizacao: ReportTable,
    equipes_desatualizadas: ReportTable,
    unidades: ReportTable,
}

#[derive(Serialize)]
struct HouseholdSection {
    atualizacao: ReportTable,
    familias_vinculadas: ReportTable,
}

#[derive(Serialize)]
struct ProductionSection {
    indicadores: production::ProductionKpis,
    cuidado: care_mix::CareMixKpis,
    arvore: Vec<FacilityProduction>,
    top_profissionais: Vec<RankedEntry>,
    top_equipes: Vec<RankedEntry>,
    atendimentos_por_tipo: Vec<(String, u64)>,
    scorecard: ReportTable,
    pressao_demanda: ReportTable,
    cuidado_programado: ReportTable,
    tipos_atendimento: ReportTable,
    esb: Option<ReportTable>,
}

fn citizen_section(ctx: &AnalysisContext) -> Option<CitizenSection> {
    if ctx.citizens().is_empty() {
        return None;
    }
    Some(CitizenSection {
        indicadores: summary::overview(ctx),
        equipes: ReportTable::team_capacity(ctx.teams()),
        documentos: ReportTable::from_crosstab(&summary::document_crosstab(ctx), "Grupo"),
        atualizacao: ReportTable::from_crosstab(&summary::recency_crosstab(ctx), "Grupo"),
        equipes_desatualizadas: ReportTable::stale_teams(&summary::stale_registrations(
            ctx,
            summary::STALE_RANKING_TOP,
        )),
        unidades: ReportTable::facility_rollup(&summary::facility_rollup(ctx)),
    })
}

fn household_section(ctx: &AnalysisContext) -> Option<HouseholdSection> {
    if ctx.households().is_empty() {
        return None;
    }
    Some(HouseholdSection {
        atualizacao: ReportTable::from_crosstab(
            &summary::household_recency_crosstab(ctx, None),
            "Estabelecimento",
        ),
        familias_vinculadas: ReportTable::from_crosstab(
            &summary::household_family_crosstab(ctx),
            "Estabelecimento",
        ),
    })
}

fn production_section(ctx: &AnalysisContext) -> Option<ProductionSection> {
    let records = ctx.productivity();
    if records.is_empty() {
        return None;
    }
    let all = production::filter_production(records, &ProductionFilter::default());
    Some(ProductionSection {
        indicadores: production::production_kpis(&all),
        cuidado: care_mix::care_mix_kpis(records),
        arvore: production::production_tree(&all),
        top_profissionais: production::top_professionals(&all, TOP_RANKED),
        top_equipes: production::top_teams(&all, TOP_RANKED),
        atendimentos_por_tipo: production::encounter_type_counts(&all),
        scorecard: ReportTable::scorecard(&care_mix::scorecard(records)),
        pressao_demanda: ReportTable::from_crosstab(
            &care_mix::demand_pressure(records, TOP_TABLE_ROWS),
            "Unidade de Saúde",
        ),
        cuidado_programado: ReportTable::from_crosstab(
            &care_mix::programmed_highlights(records, TOP_TABLE_ROWS),
            "Unidade de Saúde",
        ),
        tipos_atendimento: ReportTable::from_crosstab(
            &care_mix::encounter_table(records),
            "Unidade de Saúde",
        ),
        esb: care_mix::esb_pivot(records)
            .as_ref()
            .map(ReportTable::esb_pivot),
    })
}

fn build_report(data: &IngestResult, registry: &ParameterRegistry) -> Report {
    let params = match registry.infer_municipality(&data.source_files) {
        Some(params) => params.clone(),
        None => {
            log::warn!(
                "município não identificado pelos nomes de arquivo, usando {}",
                registry.first().municipio
            );
            registry.first().clone()
        }
    };
    let ctx = AnalysisContext::new(data, params, None, None);
    Report {
        municipio: ctx.params().municipio.clone(),
        uf: ctx.params().uf.clone(),
        arquivos: data.source_files.clone(),
        nao_reconhecidos: data.unrecognized.clone(),
        cadastros: citizen_section(&ctx),
        domicilios: household_section(&ctx),
        producao: production_section(&ctx),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        bail!("uso: aps_report <planilha.xlsx>...");
    }

    let registry =
        ParameterRegistry::load_from_env_or_default().context("falha ao carregar o registro de parâmetros")?;
    let data = ingest_paths(&paths);
    if !data.has_data() {
        bail!("nenhuma planilha reconhecida entre os arquivos informados");
    }
    if data.invalid_dates > 0 {
        log::warn!("{} datas de produção ignoradas", data.invalid_dates);
    }

    let report = build_report(&data, &registry);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
