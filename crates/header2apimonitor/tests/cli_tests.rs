//! End-to-end tests for the header2apimonitor binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const COMMON: &str = r#"<ApiMonitor>
<Headers>
        <Condition Architecture="32">
            <Variable Name="INT_PTR"    Type="Integer"  Size="4" />
            <Variable Name="UINT_PTR"   Type="Integer"  Size="4" Unsigned="True" />
        </Condition>
        <Variable Name="int" Type="Integer" Size="4" />
        <Variable Name="BOOL" Type="Integer" Size="4" />
</Headers>
</ApiMonitor>
"#;

const HEADER: &str = r#"#pragma once

WINBASEAPI
INT_PTR
WINAPI
QueryWidget(
    _In_ UINT_PTR uId,
    _Out_ int *pFlags
    );

WINBASEAPI
BOOL
WINAPI
IsWidgetReady(
    _In_ UINT_PTR uId
    );

WINBASEAPI
VOID
WINAPI
ResetWidgets(
    VOID
    );
"#;

fn installation() -> TempDir {
    let dir = TempDir::new().unwrap();
    let headers = dir.path().join("API").join("Headers");
    fs::create_dir_all(&headers).unwrap();
    fs::write(headers.join("common.h.xml"), COMMON).unwrap();
    dir
}

fn write_header(dir: &Path, name: &str, source: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, source).unwrap();
    path
}

fn h2am() -> Command {
    let mut cmd = Command::cargo_bin("header2apimonitor").unwrap();
    cmd.env_remove("ChocolateyInstall").env("H2AM_LOG", "warn");
    cmd
}

#[test]
fn test_cli_help() {
    h2am()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--apimonitor-installation-base"))
        .stdout(predicate::str::contains("--returns-true-boolean"));
}

#[test]
fn test_cli_converts_header() {
    let install = installation();
    let work = TempDir::new().unwrap();
    let header = write_header(work.path(), "widget.h", HEADER);
    let output = work.path().join("api.xml");

    h2am()
        .arg(&header)
        .arg("--apimonitor-installation-base")
        .arg(install.path())
        .arg("-o")
        .arg(&output)
        .arg("-b")
        .arg("IsWidgetReady")
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown types: int*"));

    let xml = fs::read_to_string(&output).unwrap();
    let expected = "<ApiMonitor>\n\
\t<Module Name=\"widget.dll\" CallingConvention=\"STDCALL\">\n\
\t\t<Category Name=\"Custom\" />\n\
\t\t<Api Name=\"QueryWidget\">\n\
\t\t\t<Param Type=\"UINT_PTR\" Name=\"uId\" />\n\
\t\t\t<Param Type=\"int*\" Name=\"pFlags\" />\n\
\t\t\t<Return Type=\"INT_PTR\" />\n\
\t\t\t<Success Return=\"Equal\" Value=\"0\" />\n\
\t\t</Api>\n\
\t\t<Api Name=\"IsWidgetReady\">\n\
\t\t\t<Param Type=\"UINT_PTR\" Name=\"uId\" />\n\
\t\t\t<Return Type=\"int\" />\n\
\t\t</Api>\n\
\t\t<Api Name=\"ResetWidgets\">\n\
\t\t\t<Return Type=\"void\" />\n\
\t\t</Api>\n\
\t</Module>\n\
</ApiMonitor>\n";
    assert_eq!(xml, expected);
}

#[test]
fn test_cli_includes_module_and_polarity() {
    let install = installation();
    let headers = install.path().join("API").join("Headers");
    fs::write(
        headers.join("windows.h.xml"),
        r#"<ApiMonitor><Include Filename="Headers\common.h.xml" /><Variable Name="HANDLE" /></ApiMonitor>"#,
    )
    .unwrap();

    let work = TempDir::new().unwrap();
    let header = write_header(work.path(), "handles.h", "int Baz(char* s);\nint Close(HANDLE h);\n");
    let output = work.path().join("out.xml");

    h2am()
        .arg(&header)
        .arg("--apimonitor-installation-base")
        .arg(install.path())
        .args(["-I", "windows.h", "-M", "handles64.dll", "-E", "1", "-c", ""])
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown types: char*"));

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.contains("\t<Include Filename=\"Headers\\windows.h.xml\" />\n"));
    assert!(xml.contains("\t<Module Name=\"handles64.dll\">\n"));
    assert!(xml.contains("<Success Return=\"NotEqual\" Value=\"0\" />"));
    assert!(!xml.contains("<Success Return=\"Equal\""));
}

#[test]
fn test_cli_custom_types() {
    let install = installation();
    let work = TempDir::new().unwrap();
    let custom = work.path().join("custom.xml");
    fs::write(
        &custom,
        r#"<ApiMonitor>
    <Variable Name="WIDGET_ID" Type="Alias" Base="UINT_PTR" />
</ApiMonitor>"#,
    )
    .unwrap();
    let header = write_header(work.path(), "w.h", "int Make(WIDGET_ID id);\n");
    let output = work.path().join("out.xml");

    h2am()
        .arg(&header)
        .arg("--apimonitor-installation-base")
        .arg(install.path())
        .arg("--custom-types")
        .arg(&custom)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown types").not());

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.contains(
        "\t\t<Category Name=\"Custom\" />\n\t\t<Variable Name=\"WIDGET_ID\" Type=\"Alias\" Base=\"UINT_PTR\" />\n"
    ));
}

#[test]
fn test_cli_missing_installation_dir() {
    let work = TempDir::new().unwrap();
    let header = write_header(work.path(), "a.h", "int Foo(int x);\n");

    h2am()
        .arg(&header)
        .arg("-o")
        .arg(work.path().join("out.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("installation directory"));
}

#[test]
fn test_cli_missing_include() {
    let install = installation();
    let work = TempDir::new().unwrap();
    let header = write_header(work.path(), "a.h", "int Foo(int x);\n");
    let output = work.path().join("out.xml");

    h2am()
        .arg(&header)
        .arg("--apimonitor-installation-base")
        .arg(install.path())
        .args(["-I", "nosuch.h"])
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nosuch.h"));

    assert!(!output.exists());
}

#[test]
fn test_cli_unsupported_parameter() {
    let install = installation();
    let work = TempDir::new().unwrap();
    let header = write_header(work.path(), "main.h", "int main(int argc, char *argv[]);\n");

    h2am()
        .arg(&header)
        .arg("--apimonitor-installation-base")
        .arg(install.path())
        .arg("-o")
        .arg(work.path().join("out.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("argv"));
}
