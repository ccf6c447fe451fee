// End-to-end tests for the `docmatch` binary.
// Run with: cargo test -p docmatch-cli --test cli_tests -- --nocapture

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use zip::write::SimpleFileOptions;

fn docmatch() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docmatch"));
    cmd.env_remove("RUST_LOG").env_remove("DOCMATCH_CONFIG");
    cmd
}

fn write_zip(path: &Path, entries: &[&str]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    for name in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(b"%PDF-1.4\n").unwrap();
    }
    zip.finish().unwrap();
}

fn write_clients(path: &Path) {
    std::fs::write(
        path,
        "NIT;Nombre Cliente;Correos\n\
         900219353-1;MAKRO SUPERMAYORISTA S.A.S.;pagos@makro.com.co\n\
         ;Fila sin nit;x@y.co\n\
         830012345;Lacteos del Valle;cartera@valle.co, pagos@valle.co\n\
         860034313;Panaderia Central;sin-correo\n",
    )
    .unwrap();
}

// ---------------------------------------------------------------------------
// recon run
// ---------------------------------------------------------------------------

#[test]
fn recon_run_all_matched_json() {
    let dir = tempfile::tempdir().unwrap();
    let clients = dir.path().join("clientes.csv");
    write_clients(&clients);
    let archive = dir.path().join("facturas.zip");
    write_zip(
        &archive,
        &["NIT._ 900219353 MAKRO SAS.pdf", "NIT 830012345 enero.pdf", "NIT 800111222.pdf"],
    );
    let issues = dir.path().join("filas.txt");

    let output = docmatch()
        .args(["recon", "run", "--json", "--clients"])
        .arg(&clients)
        .arg("--archive")
        .arg(&archive)
        .arg("--issues-out")
        .arg(&issues)
        .output()
        .expect("docmatch recon run");

    assert!(output.status.success(), "exit code was {:?}", output.status);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(json["summary"]["matched"], 2);
    assert_eq!(json["summary"]["documents_without_client"], 1);
    assert_eq!(json["documents_without_client"][0]["identifier"], "800111222");
    assert_eq!(json["matched"][1]["client"]["emails"][1], "pagos@valle.co");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("identifiers without client (1):"), "stderr: {stderr}");

    let issues = std::fs::read_to_string(&issues).unwrap();
    assert_eq!(issues.trim(), "row 5 (rejected): invalid email 'sin-correo'");
}

#[test]
fn recon_run_missing_documents_exits_3() {
    let dir = tempfile::tempdir().unwrap();
    let clients = dir.path().join("clientes.csv");
    std::fs::write(&clients, "nit,nombre,email\n860034313,Panaderia Central,p@central.co\n").unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(docs.join("NIT 900219353.pdf"), b"x").unwrap();

    let output = docmatch()
        .args(["recon", "run", "--clients"])
        .arg(&clients)
        .arg("--dir")
        .arg(&docs)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("clients without documents (1):"));
    assert!(stderr.contains("860034313 | Panaderia Central | p@central.co"));
}

#[test]
fn recon_run_tolerant_flag() {
    let dir = tempfile::tempdir().unwrap();
    let clients = dir.path().join("clientes.csv");
    std::fs::write(&clients, "nit,nombre,email\n9002193531,Zzz,z@z.co\n").unwrap();
    let archive = dir.path().join("facturas.zip");
    write_zip(&archive, &["NIT 900219353.pdf"]);
    let work = dir.path().join("work");

    let strict = docmatch()
        .args(["recon", "run", "--clients"])
        .arg(&clients)
        .arg("--archive")
        .arg(&archive)
        .output()
        .unwrap();
    assert_eq!(strict.status.code(), Some(3));

    let tolerant = docmatch()
        .args(["recon", "run", "--tolerant", "--clients"])
        .arg(&clients)
        .arg("--archive")
        .arg(&archive)
        .arg("--work-dir")
        .arg(&work)
        .output()
        .unwrap();
    assert!(tolerant.status.success());
    assert!(work.join("NIT 900219353.pdf").is_file(), "--work-dir keeps extracted files");
}

#[test]
fn recon_run_bad_archive_exits_5() {
    let dir = tempfile::tempdir().unwrap();
    let clients = dir.path().join("clientes.csv");
    write_clients(&clients);
    let archive = dir.path().join("roto.zip");
    std::fs::write(&archive, b"not a zip").unwrap();

    let output = docmatch()
        .args(["recon", "run", "--clients"])
        .arg(&clients)
        .arg("--archive")
        .arg(&archive)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn recon_run_requires_a_corpus() {
    let output = docmatch()
        .args(["recon", "run", "--clients", "clientes.csv"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ---------------------------------------------------------------------------
// recon validate
// ---------------------------------------------------------------------------

#[test]
fn recon_validate_reports_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cartera.recon.toml");
    std::fs::write(&path, "name = \"Cartera\"\n[matching]\ntolerant = true\n").unwrap();

    let output = docmatch().args(["recon", "validate"]).arg(&path).output().unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("valid: Cartera"));
    assert!(stderr.contains("tolerant=true"));
}

#[test]
fn recon_validate_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("malo.recon.toml");
    std::fs::write(&path, "[extraction]\nstrategies = []\n").unwrap();

    let output = docmatch().args(["recon", "validate"]).arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
}

// ---------------------------------------------------------------------------
// extract / index
// ---------------------------------------------------------------------------

#[test]
fn extract_prints_identifiers() {
    let output = docmatch()
        .args(["extract", "NIT._ 900219353 MAKRO SAS.pdf", "F_ORF_84838066.pdf"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec!["NIT._ 900219353 MAKRO SAS.pdf → 900219353", "F_ORF_84838066.pdf → -"]
    );
}

#[test]
fn extract_json_trace() {
    let output = docmatch()
        .args(["extract", "--json", "RF-84838082-900219353-V-F-F.pdf"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let traces: Vec<serde_json::Value> =
        serde_json::from_slice(&output.stdout).expect("valid JSON array");
    assert_eq!(traces[0]["winner"], "900219353");
    assert!(traces[0]["candidates"].as_array().unwrap().len() >= 1);
}

#[test]
fn index_json_summary() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("facturas.zip");
    write_zip(
        &archive,
        &["NIT 900219353 a.pdf", "NIT 900219353 b.pdf", "resumen.pdf"],
    );

    let output = docmatch()
        .args(["index", "--json", "--archive"])
        .arg(&archive)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["summary"]["total_documents"], 3);
    assert_eq!(json["summary"]["busiest_identifier"], "900219353");
    assert_eq!(json["identifiers"]["900219353"].as_array().unwrap().len(), 2);
    assert_eq!(json["unextractable"][0], "resumen.pdf");
}
