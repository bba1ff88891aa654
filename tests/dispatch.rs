/*!
End-to-end emission through a source with settings-driven switches,
correlation state, and mixed listener encodings.
*/

use std::{io, sync::Arc};

use parking_lot::Mutex;

use tracelet::{
    ActivityId, DelimitedListener, EventKind, Settings, SourceLevel, SourceSwitch, TraceContext,
    TraceData, TraceOptions, TraceSource, XmlListener,
};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn configured_source(context: TraceContext, level: &str) -> TraceSource {
    let settings = Settings::from_toml(&format!("[switches]\napp = {level:?}\n")).unwrap();

    let source = TraceSource::with_context("app", context).unwrap();
    source.set_switch(Arc::new(SourceSwitch::from_settings("app", "", &settings)));
    source.listeners().clear();

    source
}

#[test]
fn events_fan_out_to_every_encoding() {
    let source = configured_source(TraceContext::new(), "Warning");

    let records = SharedBuf::default();
    let envelopes = SharedBuf::default();
    source
        .listeners()
        .add(Arc::new(DelimitedListener::new("records", records.clone())));
    source
        .listeners()
        .add(Arc::new(XmlListener::new("envelopes", envelopes.clone())));

    source.trace_event(EventKind::Error, 7, Some("disk full"));
    source.trace_event(EventKind::Information, 8, Some("dropped"));

    assert_eq!(records.contents(), "app;Error;7;disk full;;;;;;;\n");

    let xml = envelopes.contents();
    assert_eq!(xml.lines().count(), 1);
    assert!(xml.contains("<EventID>7</EventID>"));
    assert!(xml.contains("<SubType Name=\"Error\">0</SubType>"));
    assert!(xml.contains("<ApplicationData>disk full</ApplicationData>"));
}

#[test]
fn correlation_state_flows_into_the_record() {
    let context = TraceContext::new();
    context
        .correlation()
        .start_logical_operation_with(ActivityId::from_u128(0xabc));

    let source = configured_source(context.clone(), "All");

    let records = SharedBuf::default();
    source.listeners().add(Arc::new(
        DelimitedListener::new("records", records.clone())
            .with_options(TraceOptions::LOGICAL_OPERATION_STACK),
    ));

    source.trace_event(EventKind::Warning, 1, Some("inside"));

    context.correlation().stop_logical_operation().unwrap();
    source.trace_event(EventKind::Warning, 2, Some("after"));

    assert_eq!(
        records.contents(),
        "app;Warning;1;inside;00000000-0000-0000-0000-000000000abc;;;;;;\n\
         app;Warning;2;after;;;;;;;\n"
    );
}

#[test]
fn transfers_require_activity_tracing() {
    let source = configured_source(TraceContext::new(), "Verbose");

    let envelopes = SharedBuf::default();
    source
        .listeners()
        .add(Arc::new(XmlListener::new("envelopes", envelopes.clone())));

    source.trace_transfer(3, "handoff", ActivityId::from_u128(2));
    assert_eq!(envelopes.contents(), "");

    source.switch().set_level(SourceLevel::ActivityTracing);
    source.trace_transfer(3, "handoff", ActivityId::from_u128(2));

    let xml = envelopes.contents();
    assert!(xml.contains("<SubType Name=\"Transfer\">0</SubType>"));
    assert!(xml.contains("RelatedActivityID=\"{00000000-0000-0000-0000-000000000002}\""));
}

#[test]
fn data_items_join_in_the_message_field() {
    let source = configured_source(TraceContext::new(), "Verbose");

    let records = SharedBuf::default();
    source
        .listeners()
        .add(Arc::new(DelimitedListener::new("records", records.clone())));

    source.trace_data(
        EventKind::Verbose,
        0,
        &[TraceData::from("first"), TraceData::from(2i64)],
    );

    assert_eq!(records.contents(), "app;Verbose;0;first, 2;;;;;;;\n");
}

#[test]
fn auto_flush_does_not_disturb_output() {
    let context = TraceContext::new();
    context.set_auto_flush(true);

    let source = configured_source(context, "Error");

    let records = SharedBuf::default();
    source
        .listeners()
        .add(Arc::new(DelimitedListener::new("records", records.clone())));

    source.trace_event(EventKind::Critical, 9, None);

    assert_eq!(records.contents(), "app;Critical;9;;;;;;;;\n");
}
