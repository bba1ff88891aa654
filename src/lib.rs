/*!
Pluggable diagnostic event tracing.

A [`TraceSource`] is a named entry point for emitting diagnostic events. Each
source carries a leveled [`SourceSwitch`] that decides which event kinds get
through, and an ordered collection of listeners that encode and deliver the
events that do. Listeners are trait objects behind [`TraceListener`], so
plain text, delimited records, and XML envelopes can all hang off the same
source, and applications can plug in their own encodings.

```
use std::sync::Arc;

use tracelet::{DelimitedListener, EventKind, SourceLevel, SourceSwitch, TraceSource};

# fn main() -> Result<(), tracelet::TraceError> {
let source = TraceSource::new("app")?;
source.set_switch(Arc::new(SourceSwitch::with_level("app", "", SourceLevel::Warning)));

source.listeners().clear();
source.listeners().add(Arc::new(DelimitedListener::new("records", Vec::<u8>::new())));

// Error passes a Warning switch; Information does not
source.trace_event(EventKind::Error, 1, Some("disk full"));
source.trace_event(EventKind::Information, 2, Some("dropped"));
# Ok(())
# }
```

Emission is cheap when a switch says no: the event is discarded before any
timestamp, callstack, or correlation state is captured. When a switch says
yes, one [`EventCache`] snapshot is shared by every listener for that event.

Cross-cutting state lives on a [`TraceContext`]: the [`CorrelationManager`]
that tracks activity ids and the logical operation stack, a facade-level
listener collection for direct writes, and the auto-flush flag. Sources take
their context explicitly; [`TraceSource::new`] uses the process-wide default.
*/

mod cache;
mod context;
mod correlation;
mod data;
mod error;
mod id;
mod level;
mod platform;
mod settings;
mod source;
mod switch;

pub mod listener;

pub use self::{
    cache::EventCache,
    context::{shared, TraceContext},
    correlation::CorrelationManager,
    data::{TraceData, XmlFragment},
    error::{ParseLevelError, SettingsError, TraceError},
    id::ActivityId,
    level::{EventKind, SourceLevel},
    listener::{
        delimited::DelimitedListener, text::TextListener, xml::XmlListener, ListenerState,
        TraceListener, TraceOptions,
    },
    settings::Settings,
    source::{Listeners, TraceSource},
    switch::{BooleanSwitch, SourceSwitch},
};
