//! End-to-end tests for the `ls` command.

mod common;
use common::prelude::*;

fn fixture() -> TestFixture {
    TestFixture::new()
        .with_declaration(declarations::SMALL)
        .with_file("src/userland/c/exit1.c", "int main(void) { return 1; }\n")
        .with_file("src/userland/c/sleep.c", "")
        .with_file("src/userland/c/broken.c", "")
        .with_file("src/userland/c/notes.txt", "")
        .with_file("src/kernel_modules/hello.c", "")
}

#[test]
fn test_ls_built() {
    fixture()
        .command()
        .args(["ls", "src"])
        .assert()
        .success()
        .stdout("userland/c/exit1.c\nuserland/c/sleep.c\n");
}

#[test]
fn test_ls_tested() {
    fixture()
        .command()
        .args(["ls", "src", "--tested"])
        .assert()
        .success()
        .stdout("userland/c/exit1.c\n");
}

#[test]
fn test_ls_pattern_and_count() {
    fixture()
        .command()
        .args(["ls", "src", "--pattern", "*/s*", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_ls_invalid_pattern() {
    fixture()
        .command()
        .args(["ls", "src", "--pattern", "[unclosed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid glob pattern"));
}

#[test]
fn test_ls_missing_root() {
    fixture()
        .command()
        .args(["ls", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to walk"));
}

#[test]
fn test_ls_baremetal() {
    fixture()
        .command()
        .args(["ls", "src", "--mode", "baremetal"])
        .assert()
        .success()
        .stdout("userland/c/exit1.c\nuserland/c/sleep.c\n");
}
