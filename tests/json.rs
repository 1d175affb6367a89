// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use jiff::Timestamp;
use umbra::attribute::AttributePack;
use umbra::attribute::Attributes;
use umbra::formatter::JsonFormatter;
use umbra::record::Record;
use umbra::record::RecordBuilder;
use umbra::Formatter;
use umbra::Writer;

fn render(formatter: &JsonFormatter, record: &Record<'_>) -> String {
    let mut writer = Writer::new();
    formatter.format(record, &mut writer).unwrap();
    writer.as_str().to_owned()
}

fn fatal_record<'a>(pack: &'a AttributePack<'a>) -> Record<'a> {
    RecordBuilder::new()
        .severity(3)
        .message("fatal error, please try again")
        .attributes(pack)
        .timestamp(Timestamp::from_second(1_449_859_055).unwrap())
        .pid(12345)
        .tid(0xdead)
        .build()
}

#[test]
fn defaults_produce_a_flat_compact_tree() {
    let attributes = Attributes::new().with("key", 42).with("ip", "[::]");
    let mut pack = AttributePack::new();
    pack.push(&attributes);

    let formatter = JsonFormatter::new();
    assert_eq!(
        render(&formatter, &fatal_record(&pack)),
        r#"{"message":"fatal error, please try again","severity":3,"timestamp":1449859055000000,"process":12345,"thread":"0xdead","key":42,"ip":"[::]"}"#
    );
}

#[test]
fn routing_builds_an_intermediate_object() {
    let attributes = Attributes::new().with("key", 42).with("ip", "[::]");
    let mut pack = AttributePack::new();
    pack.push(&attributes);

    let formatter = JsonFormatter::builder()
        .route("/fields", ["message", "severity"])
        .build();
    assert_eq!(
        render(&formatter, &fatal_record(&pack)),
        r#"{"fields":{"message":"fatal error, please try again","severity":3},"timestamp":1449859055000000,"process":12345,"thread":"0xdead","key":42,"ip":"[::]"}"#
    );
}

#[test]
fn renaming_applies_after_routing() {
    let pack = AttributePack::new();
    let formatter = JsonFormatter::builder()
        .route("/fields", ["message"])
        .rename("message", "#message")
        .build();
    let rendered = render(&formatter, &fatal_record(&pack));
    assert!(rendered.starts_with(r##"{"fields":{"#message":"fatal error, please try again"}"##));
}

#[test]
fn route_default_relocates_unlisted_attributes() {
    let attributes = Attributes::new().with("key", 42);
    let mut pack = AttributePack::new();
    pack.push(&attributes);

    let formatter = JsonFormatter::builder()
        .route("/", ["message", "severity", "timestamp", "process", "thread"])
        .route_default("/other")
        .build();
    let rendered = render(&formatter, &fatal_record(&pack));
    assert!(rendered.ends_with(r#""other":{"key":42}}"#));
}

#[test]
fn duplicates_are_appended_unless_unique() {
    let inner = Attributes::new().with("key", 1);
    let outer = Attributes::new().with("key", 2);
    let mut pack = AttributePack::new();
    pack.push(&inner);
    pack.push(&outer);

    let record = RecordBuilder::new().attributes(&pack).build();
    let rendered = render(&JsonFormatter::new(), &record);
    assert!(rendered.contains(r#""key":1,"key":2"#));

    let unique = JsonFormatter::builder().unique().build();
    let rendered = render(&unique, &record);
    assert!(!rendered.contains(r#""key":1"#));
    assert!(rendered.contains(r#""key":2"#));
}

#[test]
fn unique_output_has_no_duplicate_keys_at_any_path() {
    let inner = Attributes::new().with("key", 1).with("key", 3);
    let outer = Attributes::new().with("key", 2);
    let mut pack = AttributePack::new();
    pack.push(&inner);
    pack.push(&outer);

    let formatter = JsonFormatter::builder().unique().build();
    let record = RecordBuilder::new().attributes(&pack).build();
    let rendered = render(&formatter, &record);

    let occurrences = rendered.matches(r#""key":"#).count();
    assert_eq!(occurrences, 1);
}

#[test]
fn newline_terminates_each_record() {
    let pack = AttributePack::new();
    let formatter = JsonFormatter::builder().newline().build();
    let rendered = render(&formatter, &fatal_record(&pack));
    assert!(rendered.ends_with("}\n"));
}

#[test]
fn unique_output_reparses_to_the_attribute_values() {
    let attributes = Attributes::new()
        .with("key", 42)
        .with("ip", "[::]")
        .with("ratio", 0.5)
        .with("ok", true);
    let mut pack = AttributePack::new();
    pack.push(&attributes);

    let formatter = JsonFormatter::builder().unique().build();
    let rendered = render(&formatter, &fatal_record(&pack));
    let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(parsed["message"], "fatal error, please try again");
    assert_eq!(parsed["severity"], 3);
    assert_eq!(parsed["timestamp"], 1_449_859_055_000_000_i64);
    assert_eq!(parsed["process"], 12345);
    assert_eq!(parsed["thread"], "0xdead");
    assert_eq!(parsed["key"], 42);
    assert_eq!(parsed["ip"], "[::]");
    assert_eq!(parsed["ratio"], 0.5);
    assert_eq!(parsed["ok"], true);
}
