use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::write::GzEncoder;
use flate2::Compression;
use luna_core::ops::cells::{add_cell_to_notebook, set_cell_state, soft_delete_cell};
use luna_core::ops::notebooks::{create_notebook, delete_notebook_soft};
use luna_core::persistence::codec::MAGIC_HEADER;
use luna_core::persistence::{deserialize, serialize};
use luna_core::{Cell, CellStateFlag, CodecError, DocumentError, Workspace};
use std::io::Write;

fn sample_workspace() -> Workspace {
    let mut workspace = Workspace::new();
    let lab = create_notebook(&mut workspace, "Lab ü").id;
    let text = Cell::text("Notes with \"quotes\" and\nnewlines");
    let text_id = text.id.clone();
    add_cell_to_notebook(&mut workspace, &lab, text, None).unwrap();
    add_cell_to_notebook(&mut workspace, &lab, Cell::python("print('hi')"), None).unwrap();
    add_cell_to_notebook(&mut workspace, &lab, Cell::page_break(), None).unwrap();
    let python = Cell::python("x = 1");
    let python_id = python.id.clone();
    add_cell_to_notebook(&mut workspace, &lab, python, Some(0)).unwrap();
    set_cell_state(&mut workspace, &python_id, CellStateFlag::Flagged, true);
    soft_delete_cell(&mut workspace, &lab, &text_id);

    let old = create_notebook(&mut workspace, "Old").id;
    add_cell_to_notebook(&mut workspace, &old, Cell::text("archived"), None).unwrap();
    delete_notebook_soft(&mut workspace, &old).unwrap();
    workspace.last_selected_notebook_id = Some(lab);
    workspace
}

fn reencode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[test]
fn round_trip_preserves_workspace() {
    let workspace = sample_workspace();
    let payload = serialize(&workspace).unwrap();
    assert_eq!(deserialize(&payload).unwrap(), workspace);
}

#[test]
fn empty_workspace_round_trips() {
    let workspace = Workspace::new();
    assert_eq!(deserialize(&serialize(&workspace).unwrap()).unwrap(), workspace);
}

#[test]
fn payload_starts_with_magic_header_not_gzip() {
    let bytes = STANDARD.decode(serialize(&sample_workspace()).unwrap()).unwrap();
    assert_eq!(&bytes[..5], MAGIC_HEADER);
    assert!(bytes.len() > 5 + 12 + 16);
    assert_ne!(&bytes[..2], &[0x1f_u8, 0x8b]);
}

#[test]
fn same_workspace_encrypts_differently_each_time() {
    let workspace = sample_workspace();
    assert_ne!(serialize(&workspace).unwrap(), serialize(&workspace).unwrap());
}

#[test]
fn payload_without_magic_header_is_rejected() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(br#"{"version":1}"#).unwrap();
    let plain_gzip = encoder.finish().unwrap();

    assert!(matches!(
        deserialize(&reencode(&plain_gzip)),
        Err(CodecError::MissingMagicHeader)
    ));
    assert!(matches!(
        deserialize(&reencode(b"LUNA2 and more bytes than a header needs")),
        Err(CodecError::MissingMagicHeader)
    ));
    assert!(matches!(deserialize(""), Err(CodecError::MissingMagicHeader)));
}

#[test]
fn non_base64_payload_is_rejected() {
    assert!(matches!(
        deserialize("not base64 !!"),
        Err(CodecError::InvalidBase64(_))
    ));
}

#[test]
fn truncated_payload_is_rejected() {
    let mut bytes = MAGIC_HEADER.to_vec();
    bytes.extend_from_slice(&[7u8; 20]);
    assert!(matches!(
        deserialize(&reencode(&bytes)),
        Err(CodecError::Truncated { len: 25, min_len: 33 })
    ));
}

#[test]
fn tampered_payload_fails_authentication() {
    let mut bytes = STANDARD.decode(serialize(&sample_workspace()).unwrap()).unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0x40;
    assert!(matches!(
        deserialize(&reencode(&bytes)),
        Err(CodecError::Authentication)
    ));

    let mut bad_tag = STANDARD.decode(serialize(&sample_workspace()).unwrap()).unwrap();
    bad_tag[5 + 12] ^= 0x01;
    assert!(matches!(
        deserialize(&reencode(&bad_tag)),
        Err(CodecError::Authentication)
    ));
}

#[test]
fn unsupported_version_is_rejected() {
    let mut workspace = sample_workspace();
    workspace.version = 2;
    let payload = serialize(&workspace).unwrap();

    match deserialize(&payload) {
        Err(CodecError::Document(DocumentError::UnsupportedVersion(found))) => {
            assert_eq!(found, "2")
        }
        other => panic!("expected unsupported version, got {other:?}"),
    }
}
