use std::fmt;

const PREFIX: &str = "wgt";

/// Identifies one widget instance for the lifetime of the process.
///
/// The upper half is a random per-process epoch so that buttons left over from
/// a previous run never resolve to a widget of this one.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct WidgetId(u64);

impl WidgetId {
    pub(crate) fn from_parts(epoch: u32, sequence: u32) -> Self {
        Self((u64::from(epoch) << 32) | u64::from(sequence))
    }

    #[cfg(test)]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Routing key of a single clickable control: `(widget, slot)`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ComponentId {
    pub widget: WidgetId,
    pub slot: usize,
}

impl ComponentId {
    pub fn new(widget: WidgetId, slot: usize) -> Self {
        Self { widget, slot }
    }

    /// Parse a raw custom id. Anything not minted by [`ComponentId`]'s
    /// `Display` impl yields `None`, including non-canonical spellings of a
    /// minted id (`+2a`, `007`, upper case hex).
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(':');

        if parts.next()? != PREFIX {
            return None;
        }

        let widget = parts.next().filter(|w| w.len() == 16)?;
        let widget = u64::from_str_radix(widget, 16).ok()?;
        let slot = parts.next()?.parse().ok()?;

        if parts.next().is_some() {
            return None;
        }

        let id = Self::new(WidgetId(widget), slot);
        (id.to_string() == raw).then_some(id)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}:{}:{}", self.widget, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_id_parses_its_own_output() {
        let id = ComponentId::new(WidgetId::from_parts(0xdead_beef, 42), 3);
        let raw = id.to_string();

        assert_eq!(raw, "wgt:deadbeef0000002a:3");
        assert_eq!(ComponentId::parse(&raw), Some(id));
    }

    #[test]
    fn test_component_id_rejects_foreign_ids() {
        assert_eq!(ComponentId::parse("help_page_2"), None);
        assert_eq!(ComponentId::parse("wgt:zz:1"), None);
        assert_eq!(ComponentId::parse("wgt:deadbeef0000002a"), None);
        assert_eq!(ComponentId::parse("wgt:deadbeef0000002a:x"), None);
        assert_eq!(ComponentId::parse("wgt:deadbeef0000002a:1:2"), None);
        assert_eq!(ComponentId::parse(""), None);
    }

    #[test]
    fn test_component_id_rejects_non_canonical_spellings() {
        assert_eq!(ComponentId::parse("wgt:+00000000000002a:1"), None);
        assert_eq!(ComponentId::parse("wgt:000000000000002a:+1"), None);
        assert_eq!(ComponentId::parse("wgt:000000000000002a:01"), None);
        assert_eq!(ComponentId::parse("wgt:DEADBEEF0000002A:1"), None);
        assert!(ComponentId::parse("wgt:000000000000002a:1").is_some());
    }

    #[test]
    fn test_component_id_fits_custom_id_limit() {
        let id = ComponentId::new(WidgetId(u64::MAX), usize::MAX);
        assert!(id.to_string().len() <= 100);
    }
}
