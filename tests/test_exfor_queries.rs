// Integration tests for the experimental-data store queries, run against an
// in-memory SQLite database seeded with a small hand-written index.

use rusqlite::Connection;

use nucdex::request::{Observable, QueryParams};
use nucdex::{ExforStore, SearchCriteria};

fn empty_schema() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE exfor_index (
             entry_id TEXT, entry TEXT, target TEXT, projectile TEXT,
             process TEXT, residual TEXT,
             sf4 TEXT, sf5 TEXT, sf6 TEXT, sf7 TEXT, sf8 TEXT,
             level_num INTEGER, e_inc_min REAL, e_inc_max REAL,
             points INTEGER, x4_code TEXT, mt INTEGER, mf INTEGER,
             arbitrary_data INTEGER DEFAULT 0
         );
         CREATE TABLE exfor_bib (
             entry TEXT, first_author TEXT, authors TEXT, year INTEGER,
             main_reference TEXT, main_doi TEXT,
             main_facility_institute TEXT, main_facility_type TEXT
         );
         CREATE TABLE exfor_data (
             entry_id TEXT, en_inc REAL, den_inc REAL, data REAL, ddata REAL,
             level_num INTEGER, residual TEXT, angle REAL, dangle REAL,
             e_out REAL, de_out REAL, charge INTEGER, mass INTEGER,
             isomer INTEGER
         );",
    )
    .unwrap();
    conn
}

fn xs_params(elem: &str, mass: &str, reaction: &str) -> QueryParams {
    QueryParams {
        observable: Some(Observable::Xs),
        target_elem: Some(elem.to_string()),
        target_mass: Some(mass.to_string()),
        reaction: Some(reaction.to_string()),
        ..Default::default()
    }
}

#[test]
fn test_index_query_matches_target_process_and_quantity() {
    let conn = empty_schema();
    conn.execute_batch(
        "INSERT INTO exfor_index (entry_id, entry, target, process, sf6, points, x4_code, mt, mf)
         VALUES ('10001-002-0', '10001', '13-AL-27', 'N,P', 'SIG', 12, '(N,P)', 103, 3);
         INSERT INTO exfor_index (entry_id, entry, target, process, sf6, points)
         VALUES ('10002-002-0', '10002', '13-AL-27', 'N,G', 'SIG', 5);
         INSERT INTO exfor_index (entry_id, entry, target, process, sf6, points)
         VALUES ('10003-002-0', '10003', '13-AL-27', 'N,P', 'DA', 8);
         INSERT INTO exfor_index (entry_id, entry, target, process, sf6, points)
         VALUES ('10004-002-0', '10004', '26-FE-56', 'N,P', 'SIG', 9);",
    )
    .unwrap();
    let store = ExforStore::from_connection(conn);

    let entries = store.index_query(&xs_params("Al", "27", "n,p")).unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries["10001-002-0"];
    assert_eq!(entry.points, Some(12));
    assert_eq!(entry.mt, Some(103));
}

#[test]
fn test_index_query_unknown_nuclide_is_empty_not_error() {
    let store = ExforStore::from_connection(empty_schema());
    let entries = store.index_query(&xs_params("Au", "197", "n,g")).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn test_junk_switch_drops_rows_with_extraneous_subfields() {
    let conn = empty_schema();
    conn.execute_batch(
        "INSERT INTO exfor_index (entry_id, entry, target, process, sf6)
         VALUES ('20001-002-0', '20001', '13-AL-27', 'N,P', 'SIG');
         INSERT INTO exfor_index (entry_id, entry, target, process, sf5, sf6)
         VALUES ('20002-002-0', '20002', '13-AL-27', 'N,P', 'RAT', 'SIG');
         INSERT INTO exfor_index (entry_id, entry, target, process, sf6, sf7)
         VALUES ('20003-002-0', '20003', '13-AL-27', 'N,P', 'SIG', 'AV');",
    )
    .unwrap();
    let store = ExforStore::from_connection(conn);

    let all = store.index_query(&xs_params("Al", "27", "n,p")).unwrap();
    assert_eq!(all.len(), 3);

    let params = QueryParams {
        excl_junk_switch: true,
        ..xs_params("Al", "27", "n,p")
    };
    let clean = store.index_query(&params).unwrap();
    assert_eq!(clean.len(), 1);
    assert!(clean.contains_key("20001-002-0"));
}

#[test]
fn test_isomer_tagged_residuals_excluded_for_discrete_channels() {
    let conn = empty_schema();
    conn.execute_batch(
        "INSERT INTO exfor_index (entry_id, entry, target, process, sf6)
         VALUES ('30001-002-0', '30001', '13-AL-27', 'N,P', 'SIG');
         INSERT INTO exfor_index (entry_id, entry, target, process, sf4, sf6)
         VALUES ('30002-002-0', '30002', '13-AL-27', 'N,P', '12-MG-27-M', 'SIG');
         INSERT INTO exfor_index (entry_id, entry, target, process, sf4, sf6)
         VALUES ('30003-002-0', '30003', '13-AL-27', 'N,P', '12-MG-27', 'SIG');
         INSERT INTO exfor_index (entry_id, entry, target, process, sf4, sf6)
         VALUES ('30004-002-0', '30004', '92-U-235', 'N,F', '12-MG-27-M', 'SIG');",
    )
    .unwrap();
    let store = ExforStore::from_connection(conn);

    let entries = store.index_query(&xs_params("Al", "27", "n,p")).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.contains_key("30001-002-0"));
    assert!(entries.contains_key("30003-002-0"));

    // TOT / fission channels keep isomer-tagged rows
    let entries = store.index_query(&xs_params("U", "235", "n,f")).unwrap();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_level_query_rewrites_to_inelastic_and_filters_level() {
    let conn = empty_schema();
    conn.execute_batch(
        "INSERT INTO exfor_index (entry_id, entry, target, process, sf5, sf6, level_num)
         VALUES ('40001-002-0', '40001', '26-FE-56', 'N,INL', 'PAR', 'SIG', 1);
         INSERT INTO exfor_index (entry_id, entry, target, process, sf5, sf6, level_num)
         VALUES ('40002-002-0', '40002', '26-FE-56', 'N,INL', 'PAR', 'SIG', 2);
         INSERT INTO exfor_index (entry_id, entry, target, process, sf6)
         VALUES ('40003-002-0', '40003', '26-FE-56', 'N,INL', 'SIG');",
    )
    .unwrap();
    let store = ExforStore::from_connection(conn);

    let params = QueryParams {
        level_num: Some(1),
        ..xs_params("Fe", "56", "n,n1")
    };
    let entries = store.index_query(&params).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries["40001-002-0"].level_num, Some(1));
}

#[test]
fn test_rp_query_filters_on_projectile_and_residual() {
    let conn = empty_schema();
    conn.execute_batch(
        "INSERT INTO exfor_index (entry_id, entry, target, projectile, residual, sf6)
         VALUES ('50001-002-0', '50001', '47-AG-109', 'N', 'Pd-108', 'SIG');
         INSERT INTO exfor_index (entry_id, entry, target, projectile, residual, sf6)
         VALUES ('50002-002-0', '50002', '47-AG-109', 'N', 'Ag-108', 'SIG');
         INSERT INTO exfor_index (entry_id, entry, target, projectile, residual, sf6)
         VALUES ('50003-002-0', '50003', '47-AG-109', 'P', 'Pd-108', 'SIG');",
    )
    .unwrap();
    let store = ExforStore::from_connection(conn);

    let params = QueryParams {
        observable: Some(Observable::Rp),
        rp_elem: Some("Pd".to_string()),
        rp_mass: Some("108".to_string()),
        ..xs_params("Ag", "109", "n,x")
    };
    let entries = store.index_query(&params).unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries.contains_key("50001-002-0"));
}

#[test]
fn test_fy_branch_aliases_and_mass_chain_option() {
    let conn = empty_schema();
    conn.execute_batch(
        "INSERT INTO exfor_index (entry_id, entry, target, process, sf4, sf5, sf6)
         VALUES ('60001-002-0', '60001', '92-U-235', 'N,F', 'MASS', 'CUM', 'FY');
         INSERT INTO exfor_index (entry_id, entry, target, process, sf4, sf5, sf6)
         VALUES ('60002-002-0', '60002', '92-U-235', 'N,F', 'MASS', 'CHN', 'FY');
         INSERT INTO exfor_index (entry_id, entry, target, process, sf4, sf5, sf6)
         VALUES ('60003-002-0', '60003', '92-U-235', 'N,F', 'ELEM', 'CUM', 'FY');
         INSERT INTO exfor_index (entry_id, entry, target, process, sf4, sf5, sf6)
         VALUES ('60004-002-0', '60004', '92-U-235', 'N,F', 'MASS', 'IND', 'FY');",
    )
    .unwrap();
    let store = ExforStore::from_connection(conn);

    let params = QueryParams {
        observable: Some(Observable::Fy),
        branch: Some("cum".to_string()),
        mesurement_opt_fy: Some("A".to_string()),
        ..xs_params("U", "235", "n,f")
    };
    let entries = store.index_query(&params).unwrap();
    // CUM expands to {CUM, CHN}; the ELEM row fails the mass-chain option
    assert_eq!(entries.len(), 2);
    assert!(entries.contains_key("60001-002-0"));
    assert!(entries.contains_key("60002-002-0"));
}

#[test]
fn test_entry_bib_sorted_by_year_descending() {
    let conn = empty_schema();
    conn.execute_batch(
        "INSERT INTO exfor_bib (entry, first_author, year) VALUES ('10001', 'A.Author', 1978);
         INSERT INTO exfor_bib (entry, first_author, year) VALUES ('10002', 'B.Author', 2003);
         INSERT INTO exfor_bib (entry, first_author, year) VALUES ('10003', 'C.Author', NULL);",
    )
    .unwrap();
    let store = ExforStore::from_connection(conn);

    let legend = store
        .entry_bib(&[
            "10001".to_string(),
            "10002".to_string(),
            "10003".to_string(),
        ])
        .unwrap();
    let years: Vec<i32> = legend.iter().map(|(_, b)| b.year).collect();
    assert_eq!(years, vec![2003, 1978, 1900]);

    assert!(store.entry_bib(&[]).unwrap().is_empty());
}

#[test]
fn test_data_query_selects_observable_columns_and_level() {
    let conn = empty_schema();
    conn.execute_batch(
        "INSERT INTO exfor_data (entry_id, en_inc, data, ddata, level_num, residual)
         VALUES ('40001-002-0', 2.5e6, 0.31, 0.02, 1, NULL);
         INSERT INTO exfor_data (entry_id, en_inc, data, ddata, level_num, residual)
         VALUES ('40001-002-0', 3.0e6, 0.35, 0.02, 2, NULL);
         INSERT INTO exfor_data (entry_id, en_inc, data, ddata, angle)
         VALUES ('40009-002-0', 1.0e6, 0.11, 0.01, 45.0);",
    )
    .unwrap();
    let store = ExforStore::from_connection(conn);

    let params = QueryParams {
        level_num: Some(1),
        ..xs_params("Fe", "56", "n,n1")
    };
    let rows = store
        .data_query(&params, &["40001-002-0".to_string()])
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].level_num, Some(1));
    assert_eq!(rows[0].data, Some(0.31));
    // Angle columns are not part of the cross-section frame
    assert_eq!(rows[0].angle, None);

    assert!(store.data_query(&params, &[]).unwrap().is_empty());
}

#[test]
fn test_rp_residual_mass_leading_zeros_are_normalized() {
    let conn = empty_schema();
    conn.execute_batch(
        "INSERT INTO exfor_index (entry_id, entry, target, projectile, residual, sf6)
         VALUES ('51001-002-0', '51001', '41-NB-93', 'N', 'Nb-95', 'SIG');",
    )
    .unwrap();
    let store = ExforStore::from_connection(conn);

    // Zero-padded mass input matches the zero-stripped stored residual
    let params = QueryParams {
        observable: Some(Observable::Rp),
        rp_elem: Some("Nb".to_string()),
        rp_mass: Some("095".to_string()),
        ..xs_params("Nb", "93", "n,x")
    };
    let entries = store.index_query(&params).unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries.contains_key("51001-002-0"));
}

fn search_fixture() -> ExforStore {
    let conn = empty_schema();
    conn.execute_batch(
        "INSERT INTO exfor_index (entry_id, entry, target, process, sf6, e_inc_min, e_inc_max)
         VALUES ('80001-002-0', '80001', '13-AL-27', 'N,P', 'SIG', 1.0e6, 5.0e6);
         INSERT INTO exfor_index (entry_id, entry, target, process, sf6, e_inc_min, e_inc_max)
         VALUES ('80001-002-0', '80001', '13-AL-27', 'N,P', 'SIG', 8.0e6, 1.4e7);
         INSERT INTO exfor_index (entry_id, entry, target, process, sf6)
         VALUES ('80002-002-0', '80002', '13-AL-26', 'N,G', 'SIG');
         INSERT INTO exfor_index (entry_id, entry, target, process, sf6)
         VALUES ('80003-002-0', '80003', '26-FE-56', 'N,P', 'DA');
         INSERT INTO exfor_bib (entry, first_author, authors, year, main_facility_institute, main_facility_type)
         VALUES ('80001', 'Smith', 'Smith, Jones', 1985, '(2GERKFK)', '(VDG)');
         INSERT INTO exfor_bib (entry, first_author, authors, year, main_facility_institute, main_facility_type)
         VALUES ('80002', 'Tanaka', 'Tanaka, Sato', 2001, '(2JPNJAE)', '(REAC)');
         INSERT INTO exfor_bib (entry, first_author, authors, year, main_facility_institute, main_facility_type)
         VALUES ('80003', 'Smithson', 'Smithson', 1992, '(2GERKFK)', '(VDG)');",
    )
    .unwrap();
    ExforStore::from_connection(conn)
}

#[test]
fn test_entries_query_element_without_mass_matches_all_isotopes() {
    let store = search_fixture();
    let criteria = SearchCriteria {
        target_elem: Some("Al".to_string()),
        ..Default::default()
    };
    let rows = store.entries_query(&criteria).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.target.as_deref().unwrap().contains("13-AL-")));
    // Year-descending ordering
    assert_eq!(rows[0].entry, "80002");
    assert_eq!(rows[1].entry, "80001");
}

#[test]
fn test_entries_query_aggregates_energy_envelope_per_entry() {
    let store = search_fixture();
    let criteria = SearchCriteria {
        target_elem: Some("Al".to_string()),
        target_mass: Some("27".to_string()),
        reactions: vec!["n,p".to_string()],
        ..Default::default()
    };
    let rows = store.entries_query(&criteria).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].e_inc_min, Some(1.0e6));
    assert_eq!(rows[0].e_inc_max, Some(1.4e7));
    assert_eq!(rows[0].first_author.as_deref(), Some("Smith"));
}

#[test]
fn test_entries_query_author_and_facility_filters() {
    let store = search_fixture();

    // Substring author match catches both Smith and Smithson
    let criteria = SearchCriteria {
        first_author: Some("smith".to_string()),
        ..Default::default()
    };
    let rows = store.entries_query(&criteria).unwrap();
    assert_eq!(rows.len(), 2);

    // Facility codes are stored parenthesized; the filter adds the parens
    let criteria = SearchCriteria {
        facilities: vec!["2JPNJAE".to_string()],
        ..Default::default()
    };
    let rows = store.entries_query(&criteria).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entry, "80002");

    let criteria = SearchCriteria {
        types: vec!["da".to_string()],
        ..Default::default()
    };
    let rows = store.entries_query(&criteria).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entry, "80003");
}

#[test]
fn test_index_query_by_id_returns_all_rows_of_an_entry() {
    let store = search_fixture();
    let index = store
        .index_query_by_id(&["80001".to_string(), "80003".to_string()])
        .unwrap();
    assert_eq!(index.len(), 2);
    assert!(index.contains_key("80001-002-0"));
    assert!(index.contains_key("80003-002-0"));

    assert!(store.index_query_by_id(&[]).unwrap().is_empty());
}

#[test]
fn test_fission_branch_presets() {
    let conn = empty_schema();
    conn.execute_batch(
        "INSERT INTO exfor_index (entry_id, entry, target, process, sf5, sf6, e_inc_min, e_inc_max)
         VALUES ('70001-002-0', '70001', '92-U-235', 'N,F', 'PR', 'NU', 2.5e-8, 2.5e-8);
         INSERT INTO exfor_index (entry_id, entry, target, process, sf5, sf6, e_inc_min, e_inc_max)
         VALUES ('70002-002-0', '70002', '92-U-235', 'N,F', 'DL', 'NU', 1.0e6, 2.0e6);
         INSERT INTO exfor_index (entry_id, entry, target, process, sf4, sf5, sf6)
         VALUES ('70003-002-0', '70003', '92-U-235', 'N,F', '0-G-0', 'PR', 'FY');",
    )
    .unwrap();
    let store = ExforStore::from_connection(conn);

    let (entids, entries) = store
        .index_query_fission("U", "235", "n,f", "nu_n", None)
        .unwrap();
    assert_eq!(entids.len(), 1);
    assert_eq!(entries, vec!["70001".to_string()]);

    let (entids, _) = store
        .index_query_fission("U", "235", "n,f", "nu_g", None)
        .unwrap();
    assert!(entids.contains_key("70003-002-0"));

    // Energy window excludes the thermal point
    let (entids, _) = store
        .index_query_fission("U", "235", "n,f", "dn", Some((1.0e5, 3.0e6)))
        .unwrap();
    assert_eq!(entids.len(), 1);

    // Unknown presets return empty rather than scanning the index
    let (entids, entries) = store
        .index_query_fission("U", "235", "n,f", "bogus", None)
        .unwrap();
    assert!(entids.is_empty());
    assert!(entries.is_empty());
}
