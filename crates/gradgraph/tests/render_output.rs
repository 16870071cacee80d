//! Integration tests for the written PNG files

use gradgraph::{render_all, render_png, render_scenario, render_svg, Scenario};
use std::fs::File;
use std::path::Path;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

fn decode(path: &Path) -> (png::OutputInfo, Vec<u8>) {
    let decoder = png::Decoder::new(File::open(path).unwrap());
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    buf.truncate(info.buffer_size());
    (info, buf)
}

#[test]
fn test_forward_scenario_writes_comp_graph_1() {
    let dir = tempfile::tempdir().unwrap();
    let path = render_scenario(&Scenario::forward(), dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), "comp-graph-1.png");
    let bytes = std::fs::read(&path).unwrap();
    assert!(!bytes.is_empty());
    assert!(bytes.starts_with(PNG_SIGNATURE));
}

#[test]
fn test_backward_scenario_writes_comp_graph_2() {
    let dir = tempfile::tempdir().unwrap();
    let path = render_scenario(&Scenario::backward(), dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), "comp-graph-2.png");
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn test_render_all_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let written = render_all(dir.path()).unwrap();
    assert_eq!(
        written,
        vec![
            dir.path().join("comp-graph-1.png"),
            dir.path().join("comp-graph-2.png"),
        ]
    );
}

#[test]
fn test_png_is_cropped_150_dpi_on_white() {
    let dir = tempfile::tempdir().unwrap();
    let path = render_scenario(&Scenario::forward(), dir.path()).unwrap();
    let (info, buf) = decode(&path);

    // A 12 x 8 inch figure at 150 DPI is 1800 x 1200; the tight crop keeps
    // close to the full width and height.
    assert!((1500..=1900).contains(&info.width), "width {}", info.width);
    assert!((1000..=1300).contains(&info.height), "height {}", info.height);
    assert_eq!(info.color_type, png::ColorType::Rgba);

    assert_eq!(&buf[0..4], &[255, 255, 255, 255]);
}

#[test]
fn test_png_records_150_dpi() {
    let dir = tempfile::tempdir().unwrap();
    let path = render_scenario(&Scenario::backward(), dir.path()).unwrap();
    let reader = png::Decoder::new(File::open(path).unwrap())
        .read_info()
        .unwrap();
    let dims = reader.info().pixel_dims.expect("pHYs chunk");
    // 150 pixels per inch
    assert_eq!(dims.xppu, 5906);
    assert_eq!(dims.yppu, 5906);
    assert!(matches!(dims.unit, png::Unit::Meter));
}

#[test]
fn test_scenarios_render_differently() {
    let forward = render_png(&Scenario::forward()).unwrap();
    let backward = render_png(&Scenario::backward()).unwrap();
    assert_ne!(forward, backward);
}

#[test]
fn test_svg_lists_every_property_line() {
    let svg = render_svg(&Scenario::forward()).unwrap();
    assert_eq!(svg.matches("is_leaf = True").count(), 4);
    assert_eq!(svg.matches("is_leaf = False").count(), 3);
    assert_eq!(svg.matches("requires_grad = True").count(), 5);
    assert_eq!(svg.matches("requires_grad = False").count(), 2);
    assert_eq!(svg.matches("retains_grad = False").count(), 7);
    assert!(svg.contains("y_pred = ReLU(z)"));
    assert!(svg.contains("shape: (1, 3)"));
}

#[test]
fn test_unwritable_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = render_all(dir.path().join("nope").join("deeper"));
    assert!(result.is_err());
}
