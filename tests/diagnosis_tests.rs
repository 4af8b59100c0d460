// End-to-end tests: on-disk database fixtures through load, analysis
// and report rendering

mod test_helpers;

use debdoctor::analyze::Analyzer;
use debdoctor::commands::large::large_names;
use debdoctor::commands::list::{installed_names, residual_names, uncommon_lines};
use debdoctor::report;
use debdoctor::status::PackageIndex;
use test_helpers::DatabaseFixture;

fn load(fixture: &DatabaseFixture) -> PackageIndex {
    PackageIndex::load_from(&fixture.admin_dir, &fixture.apt_state_dir).unwrap()
}

#[test]
fn test_unreadable_status_database_is_fatal() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = PackageIndex::load_from(dir.path(), dir.path());
    assert!(result.is_err());
}

#[test]
fn test_missing_extended_states_means_everything_manual() {
    let fixture = DatabaseFixture::new(
        "Package: solo\nStatus: install ok installed\nVersion: 1\n",
        None,
    );
    let index = load(&fixture);
    assert!(index.get(index.lookup("solo").unwrap()).manually_installed());
}

#[test]
fn test_virtual_dependency_satisfied_by_installed_provider() {
    // foo (manual) depends on the virtual bar-provider; bar (auto) provides
    // it and must end up in the closure with nothing unmet or unneeded
    let fixture = DatabaseFixture::new(
        "Package: foo\n\
         Status: install ok installed\n\
         Version: 1.0\n\
         Installed-Size: 100\n\
         Depends: bar-provider\n\
         \n\
         Package: bar\n\
         Status: install ok installed\n\
         Version: 2.0\n\
         Installed-Size: 200\n\
         Provides: bar-provider\n",
        Some("Package: bar\nAuto-Installed: 1\n"),
    );
    let index = load(&fixture);
    let diagnosis = Analyzer::new(&index).run();

    assert!(diagnosis.unmet.is_empty());
    assert!(diagnosis.unneeded.is_empty());
    assert_eq!(report::render_unmet(&diagnosis.unmet), None);
    assert_eq!(report::render_unneeded(&diagnosis.unneeded), None);
}

#[test]
fn test_unmet_or_group_rendered_with_original_alternatives() {
    let fixture = DatabaseFixture::new(
        "Package: baz\n\
         Status: install ok installed\n\
         Version: 1.0\n\
         Depends: qux | quux\n",
        None,
    );
    let index = load(&fixture);
    let diagnosis = Analyzer::new(&index).run();

    let table = report::render_unmet(&diagnosis.unmet).unwrap();
    let expected = "\
Packages with unmet dependencies  Type  Requires
=================================-=====-==========
baz                               dep   qux | quux
";
    assert_eq!(table, expected);

    // baz itself is in its own closure, so nothing is unneeded
    assert!(diagnosis.unneeded.is_empty());
}

#[test]
fn test_unneeded_packages_rendered_sorted_with_sizes() {
    // editor is manual and pulls in libwanted; liborphan and libspare are
    // automatic leftovers
    let fixture = DatabaseFixture::new(
        "Package: editor\n\
         Status: install ok installed\n\
         Version: 3.1\n\
         Installed-Size: 500\n\
         Depends: libwanted\n\
         \n\
         Package: libwanted\n\
         Status: install ok installed\n\
         Version: 1.0\n\
         Installed-Size: 50\n\
         \n\
         Package: libspare\n\
         Status: install ok installed\n\
         Version: 1.0\n\
         Installed-Size: 7\n\
         \n\
         Package: liborphan\n\
         Status: install ok installed\n\
         Version: 1.0\n\
         Installed-Size: 3\n",
        Some(
            "Package: libwanted\nAuto-Installed: 1\n\n\
             Package: libspare\nAuto-Installed: 1\n\n\
             Package: liborphan\nAuto-Installed: 1\n",
        ),
    );
    let index = load(&fixture);
    let diagnosis = Analyzer::new(&index).run();

    assert!(diagnosis.unmet.is_empty());
    let table = report::render_unneeded(&diagnosis.unneeded).unwrap();
    let expected = "\
Unneeded packages        Size
==================-==========
liborphan                3072
libspare                 7168
";
    assert_eq!(table, expected);
}

#[test]
fn test_diagnosis_is_idempotent_over_one_snapshot() {
    let fixture = DatabaseFixture::new(
        "Package: a\n\
         Status: install ok installed\n\
         Version: 1\n\
         Depends: b, ghost\n\
         \n\
         Package: b\n\
         Status: install ok installed\n\
         Version: 1\n\
         Recommends: a\n",
        Some("Package: b\nAuto-Installed: 1\n"),
    );
    let index = load(&fixture);

    let first = Analyzer::new(&index).run();
    let second = Analyzer::new(&index).run();
    assert_eq!(first.unmet, second.unmet);
    assert_eq!(first.unneeded, second.unneeded);

    assert_eq!(first.unmet.len(), 1);
    assert_eq!(first.unmet[0].package, "a");
    assert_eq!(first.unmet[0].requires, "ghost");
}

#[test]
fn test_listing_modes_over_one_database() {
    let fixture = DatabaseFixture::new(
        "Package: current\n\
         Status: install ok installed\n\
         Version: 2.0\n\
         Installed-Size: 11264\n\
         \n\
         Package: removed\n\
         Status: deinstall ok config-files\n\
         Version: 1.0\n\
         \n\
         Package: wedged\n\
         Status: install ok unpacked\n\
         Version: 1.5\n",
        None,
    );
    let index = load(&fixture);

    assert_eq!(residual_names(&index), vec!["removed"]);
    assert_eq!(installed_names(&index), vec!["current"]);
    assert_eq!(
        uncommon_lines(&index),
        vec!["rc  removed  1.0", "iU  wedged  1.5"]
    );
    // 11264 KiB = 11 MiB, strictly above the threshold
    assert_eq!(large_names(&index), vec!["current"]);
}
