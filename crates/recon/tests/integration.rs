use std::path::{Path, PathBuf};

use docmatch_recon::config::ReconConfig;
use docmatch_recon::engine::{run, Reconciler};
use docmatch_recon::model::{ClientRecord, ExtractedDocument, MatchMethod, ReconInput, ReconResult};
use docmatch_recon::observer::NullObserver;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn client(row: usize, identifier: &str, name: &str) -> ClientRecord {
    ClientRecord {
        identifier: identifier.to_string(),
        name: name.to_string(),
        emails: vec![format!("facturacion{row}@example.com")],
        source_row: row,
    }
}

fn corpus(entries: &[&str]) -> Vec<ExtractedDocument> {
    entries
        .iter()
        .map(|entry| {
            let name = entry.rsplit('/').next().unwrap();
            ExtractedDocument::new(*entry, format!("/tmp/docmatch/{name}"))
        })
        .collect()
}

fn month_end() -> ReconInput {
    ReconInput {
        clients: vec![
            client(2, "900219353-1", "MAKRO SUPERMAYORISTA S.A.S."),
            client(3, "830.012.345", "Lacteos del Valle LTDA"),
            client(4, "", "COMERCIALIZADORA ABC LTDA"),
            client(5, "860034313", "Panaderia Central SAS"),
            client(6, "84838066", "Sin Nombre"),
        ],
        corpus: corpus(&[
            "cartera/NIT._ 900219353 MAKRO SAS.pdf",
            "cartera/RF-84838082-900219353-V-F-F.pdf",
            "cartera/NIT 830012345 enero.pdf",
            "cartera/ABC_factura_2024.pdf",
            "cartera/F_ORF_84838066.pdf",
            "cartera/NIT 800111222 otro cliente.pdf",
            "cartera/resumen.pdf",
        ]),
    }
}

fn assert_partitions(result: &ReconResult, total_clients: usize) {
    let s = &result.summary;
    assert_eq!(s.matched + s.clients_without_documents, total_clients);
    assert_eq!(
        s.matched_exact + s.matched_tolerant + s.matched_filename + s.matched_name,
        s.matched
    );
    assert_eq!(
        s.matched_documents + s.documents_without_client + s.unextractable_documents,
        s.total_documents
    );
}

// -------------------------------------------------------------------------
// Full runs
// -------------------------------------------------------------------------

#[test]
fn month_end_run() {
    let input = month_end();
    let result = run(&ReconConfig::default(), &input).unwrap();
    assert_partitions(&result, input.clients.len());

    let by_row = |row: usize| {
        result
            .matched
            .iter()
            .find(|m| m.client.source_row == row)
            .unwrap_or_else(|| panic!("row {row} unmatched"))
    };

    let makro = by_row(2);
    assert_eq!(makro.method, MatchMethod::Exact);
    assert_eq!(makro.identifier, "900219353");
    let names: Vec<_> = makro.documents.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(
        names,
        vec!["NIT._ 900219353 MAKRO SAS.pdf", "RF-84838082-900219353-V-F-F.pdf"]
    );

    assert_eq!(by_row(3).method, MatchMethod::Exact);
    assert_eq!(by_row(4).method, MatchMethod::Name);
    assert_eq!(by_row(4).documents[0].filename, "ABC_factura_2024.pdf");
    assert_eq!(by_row(6).method, MatchMethod::FilenameContains);

    assert_eq!(result.clients_without_documents.len(), 1);
    assert_eq!(result.clients_without_documents[0].source_row, 5);

    assert_eq!(result.documents_without_client.len(), 1);
    assert_eq!(result.documents_without_client[0].identifier, "800111222");

    let unextractable: Vec<_> = result.unextractable.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(unextractable, vec!["resumen.pdf"]);
}

#[test]
fn fixture_config_runs_tolerant() {
    let toml = std::fs::read_to_string(fixtures_dir().join("cartera.recon.toml")).unwrap();
    let config = ReconConfig::from_toml(&toml).unwrap();
    assert!(config.matching.tolerant);

    let input = ReconInput {
        clients: vec![client(2, "9002193531", "Makro")],
        corpus: corpus(&["NIT 900219353.pdf"]),
    };
    let result = run(&config, &input).unwrap();
    assert_eq!(result.meta.config_name, "Cartera mensual");
    assert!(result.meta.tolerant);
    assert_eq!(result.matched[0].method, MatchMethod::Tolerant);
    assert_eq!(result.matched[0].matched_key.as_deref(), Some("900219353"));
    assert_eq!(result.summary.matched_tolerant, 1);
}

#[test]
fn shared_identifier_attaches_same_documents() {
    let input = ReconInput {
        clients: vec![
            client(2, "900219353", "Makro Bogota"),
            client(3, "900219353-1", "Makro Cali"),
        ],
        corpus: corpus(&["NIT 900219353.pdf"]),
    };
    let result = run(&ReconConfig::default(), &input).unwrap();
    assert_eq!(result.matched.len(), 2);
    assert_eq!(result.summary.matched_documents, 1);
    assert_eq!(result.summary.total_documents, 1);

    let view = result.matched_by_identifier();
    assert_eq!(view.len(), 1);
    assert_eq!(view["900219353"].len(), 1);
    assert_eq!(
        result.attachments_for(3),
        Some(vec![Path::new("/tmp/docmatch/NIT 900219353.pdf")])
    );
}

#[test]
fn duplicate_corpus_entries_count_once() {
    let mut docs = corpus(&["NIT 900219353.pdf", "otro.pdf"]);
    docs.push(docs[0].clone());
    let input = ReconInput {
        clients: vec![client(2, "900219353", "Makro")],
        corpus: docs,
    };
    let result = run(&ReconConfig::default(), &input).unwrap();
    assert_eq!(result.summary.total_documents, 2);
    assert_eq!(result.matched[0].documents.len(), 1);
    assert_partitions(&result, 1);
}

#[test]
fn strategy_subset_changes_only_its_convention() {
    let toml = r#"
[extraction]
strategies = ["prefix", "anywhere"]
"#;
    let config = ReconConfig::from_toml(toml).unwrap();
    let r = Reconciler::new(&config, &NullObserver);
    let index = r.index(&corpus(&[
        "NIT 900219353.pdf",
        "RF-84838082-830012345-V.pdf",
    ]));
    let ids: Vec<_> = index.identifiers().collect();
    assert_eq!(ids, vec!["900219353"]);
    assert_eq!(index.unextractable().len(), 1);
}

#[test]
fn orphan_grouping_view() {
    let input = ReconInput {
        clients: vec![],
        corpus: corpus(&["NIT 800111222 b.pdf", "NIT 800111222 a.pdf", "NIT 700123456.pdf"]),
    };
    let result = run(&ReconConfig::default(), &input).unwrap();
    let grouped = result.orphans_by_identifier();
    assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), vec!["700123456", "800111222"]);
    assert_eq!(grouped["800111222"][0].filename, "NIT 800111222 a.pdf");
    assert_eq!(result.summary.identifiers_without_client, 2);
}

#[test]
fn result_serializes_for_reports() {
    let result = run(&ReconConfig::default(), &month_end()).unwrap();
    let json: serde_json::Value = serde_json::to_value(&result).unwrap();
    assert_eq!(json["summary"]["matched"], 4);
    assert_eq!(json["matched"][0]["method"], "exact");
    assert!(json["matched"][2].get("matched_key").is_none());
    assert_eq!(json["meta"]["tolerant"], false);
}
