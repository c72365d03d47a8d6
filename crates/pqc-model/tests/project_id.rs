//! Project id derivation across the naming variants seen in production.

use pqc_model::{ProjectId, is_standard_sample};

#[test]
fn sample_and_project_names_agree() {
    let from_sample = ProjectId::from_sample_name("Astral_20250716_XYZ_HSdia_01").unwrap();
    let from_raw = ProjectId::from_sample_name("Astral_20250716_XYZ_HSdia_01.raw").unwrap();
    let from_project = ProjectId::from_sample_name("Astral_20250716_XYZ").unwrap();

    assert_eq!(from_sample, from_raw);
    assert_eq!(from_sample, from_project);
    assert_eq!(from_sample.to_string(), "Astral_20250716_XYZ");
    assert_eq!(from_sample.regex_pattern(), "Astral_202507[0-9]{2}_XYZ");
    assert_eq!(from_sample.sql_pattern(), "Astral_202507__XYZ%");
}

#[test]
fn snapshot_file_stem_maps_back_to_project() {
    let id = ProjectId::from_sample_name("QExactive_20250728_XYZ_ProjectData.csv").unwrap();
    assert_eq!(id.as_str(), "QExactive_20250728_XYZ");
}

#[test]
fn project_ids_sort_by_id() {
    let mut ids: Vec<ProjectId> = ["Exploris_20250101_B", "Astral_20250716_Z", "Astral_20250701_A"]
        .iter()
        .map(|name| ProjectId::from_sample_name(name).unwrap())
        .collect();
    ids.sort();
    let names: Vec<&str> = ids.iter().map(ProjectId::as_str).collect();
    assert_eq!(
        names,
        vec!["Astral_20250701_A", "Astral_20250716_Z", "Exploris_20250101_B"]
    );
}

#[test]
fn standard_samples_are_recognised() {
    assert!(is_standard_sample("QExactive_20250728_HSstd_03"));
    assert!(!is_standard_sample("QExactive_20250728_XYZ_HS_01"));
}
