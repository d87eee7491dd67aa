//! Static filter tables.
//!
//! Every element/attribute name maps to one [`FilterActionEntry`] holding
//! four actions: as an element and as an attribute, each for document output
//! and for fragment output. A small exception list overrides the attribute
//! action for specific (element, attribute) pairs; it is consulted only when
//! the element or attribute action carries `HAS_EXCEPTIONS`.
//!
//! Invariants:
//! - Lookups are array indexing by `HtmlName` / `CssProperty`; no string
//!   comparison happens after name resolution.
//! - Tables are built in const context and never mutated.

use css::CssProperty;

use crate::names::HtmlName;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaseAction {
    Drop,
    Keep,
    /// Drop the element's markup, keep its content.
    DropKeepContent,
    /// Keep the element's markup, drop its content.
    KeepDropContent,
    SanitizeUrl,
    FilterStyleAttribute,
    PrefixName,
    PrefixNameList,
    ConvertBgcolorIntoStyle,
    /// Decide from the value (`http-equiv`, `display`, `position`, margins).
    CheckContent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterAction {
    base: BaseAction,
    flags: u8,
}

impl FilterAction {
    /// Route the element to the tag callback, or let the callback vet the
    /// attribute's URL.
    pub const CALLBACK: u8 = 1;
    /// Attributes of this element are not routed to the callback.
    pub const IGNORE_ATTR_CALLBACKS: u8 = 2;
    /// Consult the attribute exception list.
    pub const HAS_EXCEPTIONS: u8 = 4;

    pub const fn new(base: BaseAction) -> Self {
        Self { base, flags: 0 }
    }

    pub const fn with(self, flag: u8) -> Self {
        Self {
            base: self.base,
            flags: self.flags | flag,
        }
    }

    pub fn base(self) -> BaseAction {
        self.base
    }

    pub fn has(self, flag: u8) -> bool {
        self.flags & flag != 0
    }

    pub fn has_callback(self) -> bool {
        self.has(Self::CALLBACK)
    }
}

const DROP: FilterAction = FilterAction::new(BaseAction::Drop);
const KEEP: FilterAction = FilterAction::new(BaseAction::Keep);
const DROP_KEEP_CONTENT: FilterAction = FilterAction::new(BaseAction::DropKeepContent);
const KEEP_DROP_CONTENT: FilterAction = FilterAction::new(BaseAction::KeepDropContent);
const SANITIZE_URL: FilterAction = FilterAction::new(BaseAction::SanitizeUrl);
const FILTER_STYLE: FilterAction = FilterAction::new(BaseAction::FilterStyleAttribute);
const PREFIX_NAME: FilterAction = FilterAction::new(BaseAction::PrefixName);
const PREFIX_NAME_LIST: FilterAction = FilterAction::new(BaseAction::PrefixNameList);
const BGCOLOR_TO_STYLE: FilterAction = FilterAction::new(BaseAction::ConvertBgcolorIntoStyle);
const CHECK_CONTENT: FilterAction = FilterAction::new(BaseAction::CheckContent);

const CALLBACK: u8 = FilterAction::CALLBACK;
const EXCEPTIONS: u8 = FilterAction::HAS_EXCEPTIONS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterActionEntry {
    pub tag_action: FilterAction,
    pub tag_fragment_action: FilterAction,
    pub attr_action: FilterAction,
    pub attr_fragment_action: FilterAction,
}

const DEFAULT_ENTRY: FilterActionEntry = FilterActionEntry {
    tag_action: DROP_KEEP_CONTENT,
    tag_fragment_action: DROP_KEEP_CONTENT,
    attr_action: DROP,
    attr_fragment_action: DROP,
};

// (element, document action, fragment action)
const TAG_RULES: &[(HtmlName, FilterAction, FilterAction)] = &[
    (HtmlName::A, KEEP.with(CALLBACK).with(EXCEPTIONS), KEEP.with(CALLBACK).with(EXCEPTIONS)),
    (HtmlName::Abbr, KEEP, KEEP),
    (HtmlName::Acronym, KEEP, KEEP),
    (HtmlName::Address, KEEP, KEEP),
    (HtmlName::Applet, DROP, DROP),
    (HtmlName::Area, KEEP.with(CALLBACK).with(EXCEPTIONS), KEEP.with(CALLBACK).with(EXCEPTIONS)),
    (HtmlName::Article, KEEP, KEEP),
    (HtmlName::Aside, KEEP, KEEP),
    (HtmlName::Audio, DROP, DROP),
    (HtmlName::B, KEEP, KEEP),
    (HtmlName::Base, KEEP.with(CALLBACK).with(EXCEPTIONS), DROP),
    (HtmlName::Basefont, KEEP, DROP),
    (HtmlName::Bdi, KEEP, KEEP),
    (HtmlName::Bdo, KEEP, KEEP),
    (HtmlName::Bgsound, DROP, DROP),
    (HtmlName::Big, KEEP, KEEP),
    (HtmlName::Blink, DROP_KEEP_CONTENT, DROP_KEEP_CONTENT),
    (HtmlName::Blockquote, KEEP.with(EXCEPTIONS), KEEP.with(EXCEPTIONS)),
    (HtmlName::Body, KEEP.with(EXCEPTIONS), DROP_KEEP_CONTENT.with(EXCEPTIONS)),
    (HtmlName::Br, KEEP, KEEP),
    (HtmlName::Button, KEEP, KEEP),
    (HtmlName::Canvas, DROP, DROP),
    (HtmlName::Caption, KEEP, KEEP),
    (HtmlName::Center, KEEP, KEEP),
    (HtmlName::Cite, KEEP, KEEP),
    (HtmlName::Code, KEEP, KEEP),
    (HtmlName::Col, KEEP, KEEP),
    (HtmlName::Colgroup, KEEP, KEEP),
    (HtmlName::Dd, KEEP, KEEP),
    (HtmlName::Del, KEEP.with(EXCEPTIONS), KEEP.with(EXCEPTIONS)),
    (HtmlName::Details, KEEP, KEEP),
    (HtmlName::Dfn, KEEP, KEEP),
    (HtmlName::Dir, KEEP, KEEP),
    (HtmlName::Div, KEEP, KEEP),
    (HtmlName::Dl, KEEP, KEEP),
    (HtmlName::Dt, KEEP, KEEP),
    (HtmlName::Em, KEEP, KEEP),
    (HtmlName::Embed, DROP, DROP),
    (HtmlName::Fieldset, KEEP, KEEP),
    (HtmlName::Figcaption, KEEP, KEEP),
    (HtmlName::Figure, KEEP, KEEP),
    (HtmlName::Font, KEEP, KEEP),
    (HtmlName::Footer, KEEP, KEEP),
    (HtmlName::Form, KEEP.with(CALLBACK).with(EXCEPTIONS), KEEP.with(CALLBACK).with(EXCEPTIONS)),
    (HtmlName::Frame, DROP, DROP),
    (HtmlName::Frameset, DROP, DROP),
    (HtmlName::H1, KEEP, KEEP),
    (HtmlName::H2, KEEP, KEEP),
    (HtmlName::H3, KEEP, KEEP),
    (HtmlName::H4, KEEP, KEEP),
    (HtmlName::H5, KEEP, KEEP),
    (HtmlName::H6, KEEP, KEEP),
    (HtmlName::Head, KEEP, DROP_KEEP_CONTENT),
    (HtmlName::Header, KEEP, KEEP),
    (HtmlName::Hr, KEEP, KEEP),
    (HtmlName::Html, KEEP, DROP_KEEP_CONTENT),
    (HtmlName::I, KEEP, KEEP),
    (HtmlName::Iframe, DROP, DROP),
    (HtmlName::Img, KEEP.with(CALLBACK).with(EXCEPTIONS), KEEP.with(CALLBACK).with(EXCEPTIONS)),
    (HtmlName::Input, KEEP.with(EXCEPTIONS), KEEP.with(EXCEPTIONS)),
    (HtmlName::Ins, KEEP.with(EXCEPTIONS), KEEP.with(EXCEPTIONS)),
    (HtmlName::Isindex, DROP, DROP),
    (HtmlName::Kbd, KEEP, KEEP),
    (HtmlName::Label, KEEP, KEEP),
    (HtmlName::Legend, KEEP, KEEP),
    (HtmlName::Li, KEEP, KEEP),
    (HtmlName::Link, KEEP.with(CALLBACK).with(EXCEPTIONS), DROP),
    (HtmlName::Listing, KEEP, KEEP),
    (HtmlName::Main, KEEP, KEEP),
    (HtmlName::Map, KEEP, KEEP),
    (HtmlName::Mark, KEEP, KEEP),
    (HtmlName::Marquee, DROP_KEEP_CONTENT, DROP_KEEP_CONTENT),
    (HtmlName::Math, DROP, DROP),
    (HtmlName::Menu, KEEP, KEEP),
    (HtmlName::Meta, KEEP.with(EXCEPTIONS), DROP),
    (HtmlName::Nav, KEEP, KEEP),
    (HtmlName::Nobr, KEEP, KEEP),
    (HtmlName::Noembed, DROP, DROP),
    (HtmlName::Noframes, DROP, DROP),
    (HtmlName::Noscript, DROP_KEEP_CONTENT, DROP_KEEP_CONTENT),
    (HtmlName::Object, DROP, DROP),
    (HtmlName::Ol, KEEP, KEEP),
    (HtmlName::Optgroup, KEEP, KEEP),
    (HtmlName::Option, KEEP, KEEP),
    (HtmlName::P, KEEP, KEEP),
    (HtmlName::Param, DROP, DROP),
    (HtmlName::Plaintext, DROP_KEEP_CONTENT, DROP_KEEP_CONTENT),
    (HtmlName::Pre, KEEP, KEEP),
    (HtmlName::Q, KEEP.with(EXCEPTIONS), KEEP.with(EXCEPTIONS)),
    (HtmlName::Rp, KEEP, KEEP),
    (HtmlName::Rt, KEEP, KEEP),
    (HtmlName::Ruby, KEEP, KEEP),
    (HtmlName::S, KEEP, KEEP),
    (HtmlName::Samp, KEEP, KEEP),
    (HtmlName::Script, DROP, DROP),
    (HtmlName::Section, KEEP, KEEP),
    (HtmlName::Select, KEEP, KEEP),
    (HtmlName::Small, KEEP, KEEP),
    (HtmlName::Source, DROP, DROP),
    (HtmlName::Span, KEEP, KEEP),
    (HtmlName::Strike, KEEP, KEEP),
    (HtmlName::Strong, KEEP, KEEP),
    (HtmlName::Style, KEEP, KEEP),
    (HtmlName::Sub, KEEP, KEEP),
    (HtmlName::Summary, KEEP, KEEP),
    (HtmlName::Sup, KEEP, KEEP),
    (HtmlName::Svg, DROP, DROP),
    (HtmlName::Table, KEEP.with(EXCEPTIONS), KEEP.with(EXCEPTIONS)),
    (HtmlName::Tbody, KEEP, KEEP),
    (HtmlName::Td, KEEP.with(EXCEPTIONS), KEEP.with(EXCEPTIONS)),
    (HtmlName::Textarea, KEEP, KEEP_DROP_CONTENT),
    (HtmlName::Tfoot, KEEP, KEEP),
    (HtmlName::Th, KEEP.with(EXCEPTIONS), KEEP.with(EXCEPTIONS)),
    (HtmlName::Thead, KEEP, KEEP),
    (HtmlName::Time, KEEP, KEEP),
    (HtmlName::Title, KEEP, DROP),
    (HtmlName::Tr, KEEP, KEEP),
    (HtmlName::Tt, KEEP, KEEP),
    (HtmlName::U, KEEP, KEEP),
    (HtmlName::Ul, KEEP, KEEP),
    (HtmlName::Var, KEEP, KEEP),
    (HtmlName::Video, DROP, DROP),
    (HtmlName::Wbr, KEEP, KEEP),
    (HtmlName::Xml, DROP, DROP),
    (HtmlName::Xmp, KEEP, KEEP),
];

// (attribute, document action, fragment action)
const ATTR_RULES: &[(HtmlName, FilterAction, FilterAction)] = &[
    (HtmlName::Abbr, KEEP, KEEP),
    (HtmlName::Accept, KEEP, KEEP),
    (HtmlName::AcceptCharset, KEEP, KEEP),
    (HtmlName::Accesskey, KEEP, KEEP),
    (HtmlName::Action, DROP.with(EXCEPTIONS), DROP.with(EXCEPTIONS)),
    (HtmlName::Align, KEEP, KEEP),
    (HtmlName::Alink, KEEP, KEEP),
    (HtmlName::Alt, KEEP, KEEP),
    (HtmlName::Axis, KEEP, KEEP),
    (HtmlName::Background, DROP.with(EXCEPTIONS), DROP.with(EXCEPTIONS)),
    (HtmlName::Bgcolor, KEEP, BGCOLOR_TO_STYLE),
    (HtmlName::Border, KEEP, KEEP),
    (HtmlName::Cellpadding, KEEP, KEEP),
    (HtmlName::Cellspacing, KEEP, KEEP),
    (HtmlName::Char, KEEP, KEEP),
    (HtmlName::Charoff, KEEP, KEEP),
    (HtmlName::Charset, KEEP, KEEP),
    (HtmlName::Checked, KEEP, KEEP),
    (HtmlName::Cite, DROP.with(EXCEPTIONS), DROP.with(EXCEPTIONS)),
    (HtmlName::Class, KEEP, PREFIX_NAME_LIST),
    (HtmlName::Clear, KEEP, KEEP),
    (HtmlName::Color, KEEP, KEEP),
    (HtmlName::Cols, KEEP, KEEP),
    (HtmlName::Colspan, KEEP, KEEP),
    (HtmlName::Compact, KEEP, KEEP),
    (HtmlName::Content, DROP.with(EXCEPTIONS), DROP.with(EXCEPTIONS)),
    (HtmlName::Coords, KEEP, KEEP),
    (HtmlName::Datetime, KEEP, KEEP),
    (HtmlName::Dir, KEEP, KEEP),
    (HtmlName::Disabled, KEEP, KEEP),
    (HtmlName::Enctype, KEEP, KEEP),
    (HtmlName::Face, KEEP, KEEP),
    (HtmlName::For, KEEP, PREFIX_NAME),
    (HtmlName::Frame, KEEP, KEEP),
    (HtmlName::Headers, KEEP, PREFIX_NAME_LIST),
    (HtmlName::Height, KEEP, KEEP),
    (HtmlName::Href, DROP.with(EXCEPTIONS), DROP.with(EXCEPTIONS)),
    (HtmlName::Hreflang, KEEP, KEEP),
    (HtmlName::Hspace, KEEP, KEEP),
    (HtmlName::HttpEquiv, DROP.with(EXCEPTIONS), DROP.with(EXCEPTIONS)),
    (HtmlName::Id, KEEP, PREFIX_NAME),
    (HtmlName::Ismap, KEEP, KEEP),
    (HtmlName::Label, KEEP, KEEP),
    (HtmlName::Lang, KEEP, KEEP),
    (HtmlName::Longdesc, DROP.with(EXCEPTIONS), DROP.with(EXCEPTIONS)),
    (HtmlName::Marginheight, KEEP, KEEP),
    (HtmlName::Marginwidth, KEEP, KEEP),
    (HtmlName::Maxlength, KEEP, KEEP),
    (HtmlName::Media, KEEP, KEEP),
    (HtmlName::Method, KEEP, KEEP),
    (HtmlName::Multiple, KEEP, KEEP),
    (HtmlName::Name, KEEP, PREFIX_NAME),
    (HtmlName::Nohref, KEEP, KEEP),
    (HtmlName::Noshade, KEEP, KEEP),
    (HtmlName::Nowrap, KEEP, KEEP),
    (HtmlName::Readonly, KEEP, KEEP),
    (HtmlName::Rel, KEEP, KEEP),
    (HtmlName::Rev, KEEP, KEEP),
    (HtmlName::Rows, KEEP, KEEP),
    (HtmlName::Rowspan, KEEP, KEEP),
    (HtmlName::Rules, KEEP, KEEP),
    (HtmlName::Scope, KEEP, KEEP),
    (HtmlName::Selected, KEEP, KEEP),
    (HtmlName::Shape, KEEP, KEEP),
    (HtmlName::Size, KEEP, KEEP),
    (HtmlName::Span, KEEP, KEEP),
    (HtmlName::Src, DROP.with(EXCEPTIONS), DROP.with(EXCEPTIONS)),
    (HtmlName::Start, KEEP, KEEP),
    (HtmlName::Style, FILTER_STYLE, FILTER_STYLE),
    (HtmlName::Summary, KEEP, KEEP),
    (HtmlName::Tabindex, KEEP, KEEP),
    (HtmlName::Target, KEEP, KEEP),
    (HtmlName::Text, KEEP, KEEP),
    (HtmlName::Title, KEEP, KEEP),
    (HtmlName::Type, KEEP, KEEP),
    (HtmlName::Usemap, DROP.with(EXCEPTIONS), DROP.with(EXCEPTIONS)),
    (HtmlName::Valign, KEEP, KEEP),
    (HtmlName::Value, KEEP, KEEP),
    (HtmlName::Vlink, KEEP, KEEP),
    (HtmlName::Vspace, KEEP, KEEP),
    (HtmlName::Width, KEEP, KEEP),
];

const fn build_filter_table() -> [FilterActionEntry; HtmlName::COUNT] {
    let mut table = [DEFAULT_ENTRY; HtmlName::COUNT];
    let mut i = 0;
    while i < TAG_RULES.len() {
        let (name, document, fragment) = TAG_RULES[i];
        table[name as usize].tag_action = document;
        table[name as usize].tag_fragment_action = fragment;
        i += 1;
    }
    let mut i = 0;
    while i < ATTR_RULES.len() {
        let (name, document, fragment) = ATTR_RULES[i];
        table[name as usize].attr_action = document;
        table[name as usize].attr_fragment_action = fragment;
        i += 1;
    }
    table
}

pub static FILTER_TABLE: [FilterActionEntry; HtmlName::COUNT] = build_filter_table();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterAttributeExceptionEntry {
    pub tag: HtmlName,
    pub attr: HtmlName,
    pub action: FilterAction,
    pub fragment_action: FilterAction,
}

const fn exception(tag: HtmlName, attr: HtmlName, action: FilterAction) -> FilterAttributeExceptionEntry {
    FilterAttributeExceptionEntry {
        tag,
        attr,
        action,
        fragment_action: action,
    }
}

const URL_CHECK: FilterAction = SANITIZE_URL.with(CALLBACK);

pub static ATTRIBUTE_EXCEPTIONS: &[FilterAttributeExceptionEntry] = &[
    exception(HtmlName::A, HtmlName::Href, URL_CHECK),
    exception(HtmlName::Area, HtmlName::Href, URL_CHECK),
    exception(HtmlName::Base, HtmlName::Href, URL_CHECK),
    exception(HtmlName::Form, HtmlName::Href, URL_CHECK),
    exception(HtmlName::Img, HtmlName::Href, URL_CHECK),
    exception(HtmlName::Link, HtmlName::Href, URL_CHECK),
    exception(HtmlName::Img, HtmlName::Src, URL_CHECK),
    exception(HtmlName::Input, HtmlName::Src, URL_CHECK),
    exception(HtmlName::Body, HtmlName::Background, URL_CHECK),
    exception(HtmlName::Table, HtmlName::Background, URL_CHECK),
    exception(HtmlName::Td, HtmlName::Background, URL_CHECK),
    exception(HtmlName::Th, HtmlName::Background, URL_CHECK),
    exception(HtmlName::Form, HtmlName::Action, URL_CHECK),
    exception(HtmlName::Blockquote, HtmlName::Cite, URL_CHECK),
    exception(HtmlName::Q, HtmlName::Cite, URL_CHECK),
    exception(HtmlName::Del, HtmlName::Cite, URL_CHECK),
    exception(HtmlName::Ins, HtmlName::Cite, URL_CHECK),
    exception(HtmlName::Img, HtmlName::Longdesc, URL_CHECK),
    exception(HtmlName::Img, HtmlName::Usemap, URL_CHECK),
    exception(HtmlName::Meta, HtmlName::HttpEquiv, CHECK_CONTENT),
    exception(HtmlName::Meta, HtmlName::Content, KEEP),
];

/// Whether the output is a complete document or a fragment to embed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Document,
    Fragment,
}

pub fn tag_action(tag: HtmlName, mode: OutputMode) -> FilterAction {
    let entry = &FILTER_TABLE[tag.index()];
    match mode {
        OutputMode::Document => entry.tag_action,
        OutputMode::Fragment => entry.tag_fragment_action,
    }
}

/// Resolve an attribute action, applying the first matching exception.
pub fn attribute_action(
    tag: HtmlName,
    tag_action: FilterAction,
    attr: HtmlName,
    mode: OutputMode,
) -> FilterAction {
    let entry = &FILTER_TABLE[attr.index()];
    let base = match mode {
        OutputMode::Document => entry.attr_action,
        OutputMode::Fragment => entry.attr_fragment_action,
    };
    if !(tag_action.has(FilterAction::HAS_EXCEPTIONS) || base.has(FilterAction::HAS_EXCEPTIONS)) {
        return base;
    }
    ATTRIBUTE_EXCEPTIONS
        .iter()
        .find(|exception| exception.tag == tag && exception.attr == attr)
        .map(|exception| match mode {
            OutputMode::Document => exception.action,
            OutputMode::Fragment => exception.fragment_action,
        })
        .unwrap_or(base)
}

const fn build_css_filter() -> [FilterAction; CssProperty::COUNT] {
    let mut table = [KEEP; CssProperty::COUNT];
    table[CssProperty::Unknown as usize] = DROP;
    let dropped = [CssProperty::Behavior, CssProperty::MozBinding, CssProperty::Filter];
    let mut i = 0;
    while i < dropped.len() {
        table[dropped[i] as usize] = DROP;
        i += 1;
    }
    let checked = [
        CssProperty::Display,
        CssProperty::Position,
        CssProperty::Margin,
        CssProperty::MarginTop,
        CssProperty::MarginRight,
        CssProperty::MarginBottom,
        CssProperty::MarginLeft,
        CssProperty::TextIndent,
    ];
    let mut i = 0;
    while i < checked.len() {
        table[checked[i] as usize] = CHECK_CONTENT;
        i += 1;
    }
    table
}

pub static CSS_FILTER: [FilterAction; CssProperty::COUNT] = build_css_filter();

pub fn css_property_action(property: CssProperty) -> FilterAction {
    CSS_FILTER[property.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exception_overrides_base_attribute_action() {
        let a = tag_action(HtmlName::A, OutputMode::Document);
        let href_on_a = attribute_action(HtmlName::A, a, HtmlName::Href, OutputMode::Document);
        assert_eq!(href_on_a.base(), BaseAction::SanitizeUrl);
        assert!(href_on_a.has_callback());

        let div = tag_action(HtmlName::Div, OutputMode::Document);
        let href_on_div = attribute_action(HtmlName::Div, div, HtmlName::Href, OutputMode::Document);
        assert_eq!(href_on_div.base(), BaseAction::Drop);
    }

    #[test]
    fn fragment_table_differs_where_embedding_matters() {
        assert_eq!(tag_action(HtmlName::Body, OutputMode::Document).base(), BaseAction::Keep);
        assert_eq!(
            tag_action(HtmlName::Body, OutputMode::Fragment).base(),
            BaseAction::DropKeepContent
        );
        let div = tag_action(HtmlName::Div, OutputMode::Fragment);
        assert_eq!(
            attribute_action(HtmlName::Div, div, HtmlName::Id, OutputMode::Fragment).base(),
            BaseAction::PrefixName
        );
        assert_eq!(
            attribute_action(HtmlName::Div, div, HtmlName::Class, OutputMode::Document).base(),
            BaseAction::Keep
        );
    }

    #[test]
    fn unknown_names_use_default_row() {
        assert_eq!(
            tag_action(HtmlName::Unknown, OutputMode::Document).base(),
            BaseAction::DropKeepContent
        );
        let p = tag_action(HtmlName::P, OutputMode::Document);
        assert_eq!(
            attribute_action(HtmlName::P, p, HtmlName::Unknown, OutputMode::Document).base(),
            BaseAction::Drop
        );
        assert_eq!(tag_action(HtmlName::Script, OutputMode::Fragment).base(), BaseAction::Drop);
    }

    #[test]
    fn css_table() {
        assert_eq!(css_property_action(CssProperty::Color).base(), BaseAction::Keep);
        assert_eq!(css_property_action(CssProperty::Behavior).base(), BaseAction::Drop);
        assert_eq!(css_property_action(CssProperty::Unknown).base(), BaseAction::Drop);
        assert_eq!(
            css_property_action(CssProperty::Display).base(),
            BaseAction::CheckContent
        );
    }

    #[test]
    fn exception_list_is_small_and_unique() {
        assert!(ATTRIBUTE_EXCEPTIONS.len() < 30);
        for (i, a) in ATTRIBUTE_EXCEPTIONS.iter().enumerate() {
            for b in &ATTRIBUTE_EXCEPTIONS[i + 1..] {
                assert!(!(a.tag == b.tag && a.attr == b.attr), "duplicate exception");
            }
        }
    }
}
