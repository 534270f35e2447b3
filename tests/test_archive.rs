use ndarray::Array2;
use tempfile::TempDir;
use verdant::io::{write_grid, BaselineArchive, BaselineProvider};
use verdant::{Grid, VegError};

fn write_raster(dir: &TempDir, name: &str, fill: f32) {
    let grid: Grid = Array2::from_elem((3, 3), fill);
    write_grid(dir.path().join(name), &grid).unwrap();
}

#[test]
fn test_chronological_order_from_dated_filenames() {
    let dir = TempDir::new().unwrap();
    // Written out of order on purpose
    write_raster(&dir, "ndvi_2023-03.tif", 0.3);
    write_raster(&dir, "ndvi_2022-11.tif", 0.1);
    write_raster(&dir, "ndvi_2023-01.tif", 0.2);

    let archive = BaselineArchive::open(dir.path()).unwrap();
    assert_eq!(
        archive.identifiers().to_vec(),
        vec![
            "ndvi_2022-11.tif".to_string(),
            "ndvi_2023-01.tif".to_string(),
            "ndvi_2023-03.tif".to_string(),
        ]
    );

    // read() resolves identifiers against the archive root
    let first = archive.read("ndvi_2022-11.tif").unwrap();
    assert_eq!(first[[0, 0]], 0.1);
}

#[test]
fn test_lexical_fallback_when_dates_missing() {
    let dir = TempDir::new().unwrap();
    write_raster(&dir, "march.tif", 0.3);
    write_raster(&dir, "april.tiff", 0.4);
    write_raster(&dir, "ndvi_202301.tif", 0.1); // dated, but not all are

    let archive = BaselineArchive::open(dir.path()).unwrap();
    assert_eq!(
        archive.identifiers().to_vec(),
        vec![
            "april.tiff".to_string(),
            "march.tif".to_string(),
            "ndvi_202301.tif".to_string(),
        ]
    );
}

#[test]
fn test_non_raster_files_are_ignored() {
    let dir = TempDir::new().unwrap();
    write_raster(&dir, "ndvi_01.tif", 0.1);
    std::fs::write(dir.path().join("notes.txt"), b"not a raster").unwrap();
    std::fs::write(dir.path().join("scorer.json"), b"{}").unwrap();

    let archive = BaselineArchive::open(dir.path()).unwrap();
    assert_eq!(archive.len(), 1);
    assert!(!archive.is_empty());
}

#[test]
fn test_missing_directory_is_resource_error() {
    let err = BaselineArchive::open("/no/such/archive").unwrap_err();
    assert!(matches!(err, VegError::ResourceAccess { .. }));
    assert_eq!(err.stage(), "raster-access");
}

#[test]
fn test_ordering_is_stable_across_opens() {
    let dir = TempDir::new().unwrap();
    for i in 0..8 {
        write_raster(&dir, &format!("ndvi_2022{:02}.tif", i + 1), 0.1 * i as f32);
    }

    let first = BaselineArchive::open(dir.path()).unwrap();
    let second = BaselineArchive::open(dir.path()).unwrap();
    assert_eq!(first.identifiers(), second.identifiers());
}
