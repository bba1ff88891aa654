use core::fmt;

use value_bag::ValueBag;

/// A pre-rendered structured-document subtree.
///
/// The XML listener embeds a fragment verbatim, namespaces and all; every
/// other listener renders its raw text through the normal display path.
/// The caller is responsible for the fragment being well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlFragment(String);

impl XmlFragment {
    pub fn new(xml: impl Into<String>) -> Self {
        XmlFragment(xml.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One payload item attached to a `trace_data` call.
pub enum TraceData<'a> {
    /// An opaque captured value, rendered through its display form.
    Value(ValueBag<'a>),
    /// A structured subtree the XML listener embeds verbatim.
    Fragment(&'a XmlFragment),
}

impl<'a> TraceData<'a> {
    /// Capture a value through its `Display` implementation.
    pub fn capture_display<T: fmt::Display + 'static>(value: &'a T) -> Self {
        TraceData::Value(ValueBag::capture_display(value))
    }
}

impl<'a> From<ValueBag<'a>> for TraceData<'a> {
    fn from(value: ValueBag<'a>) -> Self {
        TraceData::Value(value)
    }
}

impl<'a> From<&'a str> for TraceData<'a> {
    fn from(value: &'a str) -> Self {
        TraceData::Value(ValueBag::from(value))
    }
}

impl<'a> From<i64> for TraceData<'a> {
    fn from(value: i64) -> Self {
        TraceData::Value(ValueBag::from(value))
    }
}

impl<'a> From<u64> for TraceData<'a> {
    fn from(value: u64) -> Self {
        TraceData::Value(ValueBag::from(value))
    }
}

impl<'a> From<f64> for TraceData<'a> {
    fn from(value: f64) -> Self {
        TraceData::Value(ValueBag::from(value))
    }
}

impl<'a> From<bool> for TraceData<'a> {
    fn from(value: bool) -> Self {
        TraceData::Value(ValueBag::from(value))
    }
}

impl<'a> From<&'a XmlFragment> for TraceData<'a> {
    fn from(fragment: &'a XmlFragment) -> Self {
        TraceData::Fragment(fragment)
    }
}

impl fmt::Display for TraceData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceData::Value(value) => fmt::Display::fmt(value, f),
            TraceData::Fragment(fragment) => f.write_str(fragment.as_str()),
        }
    }
}

impl fmt::Debug for TraceData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceData::Value(value) => fmt::Debug::fmt(value, f),
            TraceData::Fragment(fragment) => fmt::Debug::fmt(fragment, f),
        }
    }
}

pub(crate) fn join(items: &[TraceData<'_>], separator: &str) -> String {
    let mut out = String::new();

    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }

        use fmt::Write as _;
        let _ = write!(out, "{}", item);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_render_through_display() {
        assert_eq!(TraceData::from(42i64).to_string(), "42");
        assert_eq!(TraceData::from("hello").to_string(), "hello");
        assert_eq!(TraceData::from(true).to_string(), "true");
    }

    #[test]
    fn fragments_render_raw() {
        let fragment = XmlFragment::new("<a x=\"1\"/>");

        assert_eq!(TraceData::from(&fragment).to_string(), "<a x=\"1\"/>");
    }

    #[test]
    fn join_separates_items() {
        let items = [TraceData::from(1i64), TraceData::from("two")];

        assert_eq!(join(&items, ", "), "1, two");
    }
}
