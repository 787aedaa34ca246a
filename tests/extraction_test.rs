//! End-to-end extraction tests over synthetic .docx packages built in-memory.

use std::collections::BTreeMap;
use std::io::Write;

use qdox::{ExtractConfig, NullConverter, Package, extract_questions};
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;

/// Build a minimal .docx package from a body XML fragment plus optional
/// relationships and binary parts.
fn build_docx(
    body_xml: &str,
    relationships: &[(&str, &str)],
    parts: &[(&str, &[u8])],
) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".docx")
        .tempfile()
        .expect("temp file");

    let mut writer = zip::ZipWriter::new(file.reopen().expect("reopen temp file"));
    let options = SimpleFileOptions::default();

    writer.start_file("word/document.xml", options).unwrap();
    writer
        .write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
            xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math"
            xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
            xmlns:o="urn:schemas-microsoft-com:office:office"
            xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
<w:body>{body_xml}</w:body>
</w:document>"#
            )
            .as_bytes(),
        )
        .unwrap();

    let rels: String = relationships
        .iter()
        .map(|(id, target)| format!(r#"<Relationship Id="{id}" Type="t" Target="{target}"/>"#))
        .collect();
    writer
        .start_file("word/_rels/document.xml.rels", options)
        .unwrap();
    writer
        .write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
            )
            .as_bytes(),
        )
        .unwrap();

    for (path, bytes) in parts {
        writer.start_file(*path, options).unwrap();
        writer.write_all(bytes).unwrap();
    }

    writer.finish().unwrap();
    file
}

fn simple_para(text: &str) -> String {
    format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
}

#[test]
fn three_question_document_yields_three_records() {
    let body = [
        simple_para("Midterm Paper"),
        simple_para("1.First a) one b) two Key: a"),
        simple_para("2.Second a) one b) two Key: b"),
        simple_para("3.Third a) one b) two Key: a"),
    ]
    .concat();
    let file = build_docx(&body, &[], &[]);

    let package = Package::open(file.path()).unwrap();
    let records = extract_questions(&package, &ExtractConfig::default(), &NullConverter);

    assert_eq!(records.len(), 3);
    let numbers: Vec<_> = records.iter().filter_map(|r| r.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[test]
fn worked_example_paragraph_splits_into_all_fields() {
    let body = simple_para("3.The area is a) 5 b) 10 c) 15 d) 20 Key: c Hint: compute πr²");
    let file = build_docx(&body, &[], &[]);

    let package = Package::open(file.path()).unwrap();
    let records = extract_questions(&package, &ExtractConfig::default(), &NullConverter);

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.number, Some(3));
    assert_eq!(record.stem, "The area is");
    assert_eq!(
        record.options,
        BTreeMap::from([
            ('a', "5".to_string()),
            ('b', "10".to_string()),
            ('c', "15".to_string()),
            ('d', "20".to_string()),
        ])
    );
    assert_eq!(record.key.as_deref(), Some("c"));
    assert_eq!(record.hint.as_deref(), Some("compute πr²"));
}

#[test]
fn superscript_runs_merge_into_mathml() {
    let body = r#"<w:p>
        <w:r><w:t>1.Planck charge is 10</w:t></w:r>
        <w:r><w:rPr><w:vertAlign w:val="superscript"/></w:rPr><w:t>-19</w:t></w:r>
        <w:r><w:t> roughly a) yes b) no</w:t></w:r>
    </w:p>"#;
    let file = build_docx(body, &[], &[]);

    let package = Package::open(file.path()).unwrap();
    let records = extract_questions(&package, &ExtractConfig::default(), &NullConverter);

    assert_eq!(records.len(), 1);
    assert!(
        records[0]
            .stem
            .contains("<math><msup><mn>10</mn><mn>-19</mn></msup></math>"),
        "stem was: {}",
        records[0].stem
    );
    assert!(
        !records[0].stem.contains("10 <math>"),
        "base digits must be claimed by the markup"
    );
}

#[test]
fn symbol_font_characters_resolve_to_unicode() {
    let body = r#"<w:p>
        <w:r><w:t>2.The value of </w:t></w:r>
        <w:r><w:sym w:font="Symbol" w:char="F070"/></w:r>
        <w:r><w:t> is about a) 3.14 b) 2.72</w:t></w:r>
    </w:p>"#;
    let file = build_docx(body, &[], &[]);

    let package = Package::open(file.path()).unwrap();
    let records = extract_questions(&package, &ExtractConfig::default(), &NullConverter);

    assert!(records[0].stem.contains('π'), "stem was: {}", records[0].stem);
}

#[test]
fn omml_equation_lands_in_stem_as_mathml() {
    let body = r#"<w:p>
        <w:r><w:t>4.Simplify</w:t></w:r>
        <m:oMath>
            <m:sSub><m:e><m:r><m:t>v</m:t></m:r></m:e><m:sub><m:r><m:t>x</m:t></m:r></m:sub></m:sSub>
        </m:oMath>
    </w:p>"#;
    let file = build_docx(body, &[], &[]);

    let package = Package::open(file.path()).unwrap();
    let records = extract_questions(&package, &ExtractConfig::default(), &NullConverter);

    assert!(
        records[0]
            .stem
            .contains("<math><msub><mi>v</mi><mi>x</mi></msub></math>"),
        "stem was: {}",
        records[0].stem
    );
}

#[test]
fn image_binds_to_open_question_with_synthetic_name() {
    let png = [0x89u8, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
    let body = format!(
        r#"{}<w:p>
            <w:r><w:t>See the figure.</w:t></w:r>
            <w:r><w:drawing><a:blip r:embed="rId7"/></w:drawing></w:r>
        </w:p>{}"#,
        simple_para("5.Circuit question refers to the figure below"),
        simple_para("Is the switch a) open b) closed")
    );
    let file = build_docx(
        &body,
        &[("rId7", "media/image1.png")],
        &[("word/media/image1.png", &png)],
    );

    let package = Package::open(file.path()).unwrap();
    let records = extract_questions(&package, &ExtractConfig::default(), &NullConverter);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].images.len(), 1);
    assert_eq!(records[0].images[0].name, "image_1.png");
    assert_eq!(records[0].images[0].bytes, png);
    // The filename is referenced from the question text too.
    assert!(records[0].stem.contains("image_1.png"));
}

#[test]
fn dangling_image_relationship_is_skipped_not_fatal() {
    let body = r#"<w:p>
        <w:r><w:t>6.Broken figure for the equation</w:t></w:r>
        <w:r><w:drawing><a:blip r:embed="rId404"/></w:drawing></w:r>
        <m:oMath><m:r><m:t>z</m:t></m:r></m:oMath>
    </w:p>"#;
    let file = build_docx(body, &[], &[]);

    let package = Package::open(file.path()).unwrap();
    let records = extract_questions(&package, &ExtractConfig::default(), &NullConverter);

    assert_eq!(records.len(), 1);
    assert!(records[0].images.is_empty());
    // Sibling math in the same paragraph still converts.
    assert!(records[0].stem.contains("<math><mi>z</mi></math>"));
}

#[test]
fn package_without_body_part_extracts_nothing() {
    let file = tempfile::Builder::new()
        .suffix(".docx")
        .tempfile()
        .unwrap();
    let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
    writer
        .start_file("word/other.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"<x/>").unwrap();
    writer.finish().unwrap();

    let package = Package::open(file.path()).unwrap();
    let records = extract_questions(&package, &ExtractConfig::default(), &NullConverter);
    assert!(records.is_empty());
}

#[test]
fn extraction_is_idempotent_across_calls() {
    let body = [
        simple_para("1.One a) x b) y Key: a"),
        simple_para("2.Two a) x b) y Key: b Hint: think"),
    ]
    .concat();
    let file = build_docx(&body, &[], &[]);

    let package = Package::open(file.path()).unwrap();
    let first = extract_questions(&package, &ExtractConfig::default(), &NullConverter);
    let second = extract_questions(&package, &ExtractConfig::default(), &NullConverter);

    assert_eq!(first, second);
}

#[test]
fn image_counter_restarts_for_each_extraction() {
    let png = [1u8, 2, 3];
    let body = r#"<w:p>
            <w:r><w:t>1.With figure a) x b) y</w:t></w:r>
            <w:r><w:drawing><a:blip r:embed="rId1"/></w:drawing></w:r>
        </w:p>"#;
    let file = build_docx(
        body,
        &[("rId1", "media/image1.png")],
        &[("word/media/image1.png", &png)],
    );

    let package = Package::open(file.path()).unwrap();
    for _ in 0..2 {
        let records = extract_questions(&package, &ExtractConfig::default(), &NullConverter);
        assert_eq!(records[0].images[0].name, "image_1.png");
    }
}
