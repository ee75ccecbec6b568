use super::*;
use filever_types::IndexValue;

const WITH_ITEMS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Objs Version="1.1.0.1" xmlns="http://schemas.microsoft.com/powershell/2004/04">
  <Obj RefId="0">
    <TN RefId="0">
      <T>System.Management.Automation.PSCustomObject</T>
      <T>System.Object</T>
    </TN>
    <MS>
      <S N="createdUtc">2026-02-16T23:09:08.4209857Z</S>
      <S N="startedUtc">2026-02-16T23:08:14.6110939Z</S>
      <S N="algorithm">SHA256</S>
      <S N="root">\\192.168.1.1\anime</S>
      <I32 N="total">2</I32>
      <I32 N="okCount">1</I32>
      <I32 N="errorCount">1</I32>
      <Obj N="items" RefId="1">
        <TN RefId="1">
          <T>System.Object[]</T>
          <T>System.Array</T>
          <T>System.Object</T>
        </TN>
        <LST>
          <Obj RefId="2">
            <TN RefId="2">
              <T>System.Collections.Specialized.OrderedDictionary</T>
              <T>System.Object</T>
            </TN>
            <DCT>
              <En><S N="Key">ok</S><B N="Value">true</B></En>
              <En><S N="Key">path</S><S N="Value">\\192.168.1.1\anime\a.mkv</S></En>
              <En><S N="Key">length</S><I64 N="Value">10</I64></En>
              <En><S N="Key">hash</S><S N="Value">AAA</S></En>
              <En><S N="Key">error</S><Nil N="Value" /></En>
            </DCT>
          </Obj>
          <Obj RefId="3">
            <TNRef RefId="2" />
            <DCT>
              <En><S N="Key">ok</S><B N="Value">false</B></En>
              <En><S N="Key">path</S><S N="Value">\\192.168.1.1\anime\b.mkv</S></En>
              <En><S N="Key">length</S><I64 N="Value">20</I64></En>
              <En><S N="Key">hash</S><S N="Value">BBB</S></En>
              <En><S N="Key">error</S><S N="Value">access denied</S></En>
            </DCT>
          </Obj>
        </LST>
      </Obj>
    </MS>
  </Obj>
</Objs>"#;

const NO_ITEMS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Objs Version="1.1.0.1" xmlns="http://schemas.microsoft.com/powershell/2004/04">
  <Obj RefId="0">
    <MS>
      <S N="algorithm">SHA1</S>
      <S N="root">\\server\share</S>
      <I32 N="total">0</I32>
    </MS>
  </Obj>
</Objs>"#;

const NO_ROOT_OBJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Objs Version="1.1.0.1" xmlns="http://schemas.microsoft.com/powershell/2004/04">
</Objs>"#;

fn single_record(entries: &str) -> String {
    format!(
        r#"<Objs><Obj RefId="0"><MS><S N="algorithm">MD5</S>
<Obj N="items"><LST><Obj><DCT>{entries}</DCT></Obj></LST></Obj></MS></Obj></Objs>"#
    )
}

#[test]
fn test_parse_items_and_total_bytes() {
    let index = parse_index(WITH_ITEMS.as_bytes()).unwrap();

    assert_eq!(index.run.algorithm, "SHA256");
    assert_eq!(index.run.root(), Some(r"\\192.168.1.1\anime"));
    assert_eq!(index.run.total(), Some(2));
    assert_eq!(index.run.error_count(), Some(1));
    assert_eq!(
        index.run.meta.get("algorithm"),
        Some(&IndexValue::Str("SHA256".into()))
    );
    // Errored items are excluded from the byte total
    assert_eq!(index.run.total_bytes, 10);

    assert_eq!(
        index.items,
        vec![
            IndexedFileItem {
                ok: true,
                path: r"\\192.168.1.1\anime\a.mkv".into(),
                length: 10,
                hash: "AAA".into(),
                error: None,
            },
            IndexedFileItem {
                ok: false,
                path: r"\\192.168.1.1\anime\b.mkv".into(),
                length: 20,
                hash: "BBB".into(),
                error: Some("access denied".into()),
            },
        ]
    );
    assert_eq!(index.errored_items(), 1);
}

#[test]
fn test_no_items_member_is_empty_index() {
    let index = parse_index(NO_ITEMS.as_bytes()).unwrap();
    assert_eq!(index.run.algorithm, "SHA1");
    assert_eq!(index.run.root(), Some(r"\\server\share"));
    assert!(index.items.is_empty());
    assert_eq!(index.run.total_bytes, 0);
}

#[test]
fn test_items_member_without_list_is_empty() {
    let xml = r#"<Objs><Obj><MS><S N="algorithm">SHA256</S><Obj N="items"/></MS></Obj></Objs>"#;
    let index = parse_index(xml.as_bytes()).unwrap();
    assert!(index.items.is_empty());
    assert_eq!(index.run.total_bytes, 0);
}

#[test]
fn test_no_root_object_fails() {
    let err = parse_index(NO_ROOT_OBJECT.as_bytes()).unwrap_err();
    assert!(matches!(err, IndexError::NoRootObject));
    assert_eq!(err.to_string(), "clixml: no top-level objects");
}

#[test]
fn test_wrong_root_element_and_garbage_fail() {
    assert!(matches!(
        parse_index(b"<Objects><Obj/></Objects>"),
        Err(IndexError::MalformedDocument { .. })
    ));
    assert!(matches!(
        parse_index(b"<Objs><Obj>"),
        Err(IndexError::MalformedDocument { .. })
    ));
}

#[test]
fn test_unknown_members_and_keys_are_preserved_or_ignored() {
    let xml = r#"<Objs><Obj><MS>
        <S N="algorithm">SHA256</S>
        <S N="producer">indexer v9</S>
        <B N="recursive">true</B>
        <I64 N="bytesSeen">123</I64>
        <Nil N="note" />
        <Obj N="options"><MS><S N="nested">x</S></MS></Obj>
        <Obj N="items"><LST><Obj><DCT>
          <En><S N="Key">path</S><S N="Value">a</S></En>
          <En><S N="Key">mtime</S><DT N="Value">2026-01-01T00:00:00Z</DT></En>
          <En><S N="Key">length</S><I64 N="Value">5</I64></En>
        </DCT></Obj></LST></Obj>
    </MS></Obj></Objs>"#;
    let index = parse_index(xml.as_bytes()).unwrap();

    let meta = &index.run.meta;
    assert_eq!(meta.get("producer"), Some(&IndexValue::Str("indexer v9".into())));
    assert_eq!(meta.get("recursive"), Some(&IndexValue::Bool(true)));
    assert_eq!(meta.get("bytesSeen"), Some(&IndexValue::Int(123)));
    assert_eq!(meta.get("note"), Some(&IndexValue::Nil));
    assert!(!meta.contains_key("nested"));
    assert!(!meta.contains_key("options"));

    assert_eq!(index.items.len(), 1);
    assert_eq!(index.items[0].path, "a");
    assert_eq!(index.items[0].length, 5);
}

#[test]
fn test_textual_encodings_accepted() {
    let xml = single_record(
        r#"<En><S N="Key">ok</S><S N="Value">Yes</S></En>
           <En><S N="Key">length</S><S N="Value">2048</S></En>"#,
    );
    let index = parse_index(xml.as_bytes()).unwrap();
    assert!(index.items[0].ok);
    assert_eq!(index.items[0].length, 2048);
    assert_eq!(index.run.total_bytes, 2048);
}

#[test]
fn test_bad_length_fails_whole_document() {
    let xml = single_record(r#"<En><S N="Key">length</S><S N="Value">big</S></En>"#);
    let err = parse_index(xml.as_bytes()).unwrap_err();
    assert!(matches!(err, IndexError::EntryDecode { ref key, .. } if key == "length"));

    let xml = single_record(r#"<En><S N="Key">length</S><I64 N="Value">-4</I64></En>"#);
    assert!(parse_index(xml.as_bytes()).is_err());
}

#[test]
fn test_total_bytes_overflow_is_decode_error() {
    let record = r#"<Obj><DCT><En><S N="Key">ok</S><B N="Value">true</B></En>
<En><S N="Key">length</S><I64 N="Value">9223372036854775807</I64></En></DCT></Obj>"#;
    let xml = format!(
        r#"<Objs><Obj RefId="0"><MS><S N="algorithm">MD5</S>
<Obj N="items"><LST>{record}{record}{record}</LST></Obj></MS></Obj></Objs>"#
    );
    let err = parse_index(xml.as_bytes()).unwrap_err();
    assert!(matches!(err, IndexError::EntryDecode { ref key, .. } if key == "length"));

    // Two maximal records still fit in a u64
    let xml = format!(
        r#"<Objs><Obj RefId="0"><MS><S N="algorithm">MD5</S>
<Obj N="items"><LST>{record}{record}</LST></Obj></MS></Obj></Objs>"#
    );
    let index = parse_index(xml.as_bytes()).unwrap();
    assert_eq!(index.run.total_bytes, 18_446_744_073_709_551_614);
}

#[test]
fn test_native_bool_must_be_boolean() {
    let xml = single_record(r#"<En><S N="Key">ok</S><B N="Value">maybe</B></En>"#);
    assert!(matches!(
        parse_index(xml.as_bytes()),
        Err(IndexError::EntryDecode { ref key, .. }) if key == "ok"
    ));
}

#[test]
fn test_bad_bool_text_fails() {
    let xml = single_record(r#"<En><S N="Key">ok</S><S N="Value">perhaps</S></En>"#);
    assert!(matches!(
        parse_index(xml.as_bytes()),
        Err(IndexError::EntryDecode { .. })
    ));
}

#[test]
fn test_incomplete_entries_and_records_skipped() {
    let xml = r#"<Objs><Obj><MS><S N="algorithm">SHA256</S>
        <Obj N="items"><LST>
          <Obj><DCT>
            <En><S N="Key">path</S></En>
            <En><S N="Value">orphan</S></En>
            <En><S N="Key">path</S><S N="Value">kept</S></En>
          </DCT></Obj>
          <Obj><MS><S N="unrelated">x</S></MS></Obj>
        </LST></Obj></MS></Obj></Objs>"#;
    let index = parse_index(xml.as_bytes()).unwrap();
    assert_eq!(index.items.len(), 1);
    assert_eq!(index.items[0].path, "kept");
}

#[test]
fn test_escaped_strings_decoded() {
    let xml = single_record(
        r#"<En><S N="Key">path</S><S N="Value">C:\media\a_x005F_b_x0009_.mkv</S></En>"#,
    );
    let index = parse_index(xml.as_bytes()).unwrap();
    assert_eq!(index.items[0].path, "C:\\media\\a_b\t.mkv");
}

#[test]
fn test_utf16_document() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in NO_ITEMS.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let index = parse_index(&bytes).unwrap();
    assert_eq!(index.run.algorithm, "SHA1");
}

#[tokio::test]
async fn test_load_index_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_index(dir.path().join("absent.clixml"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Storage(StorageError::PathNotFound { .. })
    ));
}

#[tokio::test]
async fn test_loader_emits_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.clixml");
    tokio::fs::write(&path, WITH_ITEMS).await.unwrap();

    let (tx, mut rx) = filever_events::channel();
    let index = IndexLoader::new()
        .with_event_sender(tx)
        .load(&path)
        .await
        .unwrap();
    assert_eq!(index.items.len(), 2);

    assert!(matches!(
        rx.recv().await.unwrap(),
        AppEvent::Index(IndexEvent::LoadStarted { .. })
    ));
    match rx.recv().await.unwrap() {
        AppEvent::Index(IndexEvent::Loaded {
            items,
            errored_items,
            total_bytes,
            ..
        }) => {
            assert_eq!(items, 2);
            assert_eq!(errored_items, 1);
            assert_eq!(total_bytes, 10);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_loader_reports_parse_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.clixml");
    tokio::fs::write(&path, NO_ROOT_OBJECT).await.unwrap();

    let (tx, mut rx) = filever_events::channel();
    let err = IndexLoader::new()
        .with_event_sender(tx)
        .load(&path)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Index(IndexError::NoRootObject)));

    let _started = rx.recv().await.unwrap();
    match rx.recv().await.unwrap() {
        AppEvent::Index(IndexEvent::LoadFailed { failure, .. }) => {
            assert_eq!(failure.code.as_deref(), Some("index.no_root_object"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}
