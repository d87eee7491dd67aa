//! Element and attribute name index.
//!
//! One enumeration covers both vocabularies, so a filter table row can carry
//! the element actions and the attribute actions of the same name (`style`,
//! `cite`, `title` and friends are both).

use tools::define_names;

define_names! {
    pub enum HtmlName {
        A => "a",
        Abbr => "abbr",
        Accept => "accept",
        AcceptCharset => "accept-charset",
        Accesskey => "accesskey",
        Acronym => "acronym",
        Action => "action",
        Address => "address",
        Align => "align",
        Alink => "alink",
        Alt => "alt",
        Applet => "applet",
        Archive => "archive",
        Area => "area",
        Article => "article",
        Aside => "aside",
        Audio => "audio",
        Axis => "axis",
        B => "b",
        Background => "background",
        Base => "base",
        Basefont => "basefont",
        Bdi => "bdi",
        Bdo => "bdo",
        Bgcolor => "bgcolor",
        Bgsound => "bgsound",
        Big => "big",
        Blink => "blink",
        Blockquote => "blockquote",
        Body => "body",
        Border => "border",
        Br => "br",
        Button => "button",
        Canvas => "canvas",
        Caption => "caption",
        Cellpadding => "cellpadding",
        Cellspacing => "cellspacing",
        Center => "center",
        Char => "char",
        Charoff => "charoff",
        Charset => "charset",
        Checked => "checked",
        Cite => "cite",
        Class => "class",
        Classid => "classid",
        Clear => "clear",
        Code => "code",
        Codebase => "codebase",
        Col => "col",
        Colgroup => "colgroup",
        Color => "color",
        Cols => "cols",
        Colspan => "colspan",
        Compact => "compact",
        Content => "content",
        Coords => "coords",
        Data => "data",
        Datetime => "datetime",
        Dd => "dd",
        Del => "del",
        Details => "details",
        Dfn => "dfn",
        Dir => "dir",
        Disabled => "disabled",
        Div => "div",
        Dl => "dl",
        Dt => "dt",
        Dynsrc => "dynsrc",
        Em => "em",
        Embed => "embed",
        Enctype => "enctype",
        Face => "face",
        Fieldset => "fieldset",
        Figcaption => "figcaption",
        Figure => "figure",
        Font => "font",
        Footer => "footer",
        For => "for",
        Form => "form",
        Formaction => "formaction",
        Frame => "frame",
        Frameborder => "frameborder",
        Frameset => "frameset",
        H1 => "h1",
        H2 => "h2",
        H3 => "h3",
        H4 => "h4",
        H5 => "h5",
        H6 => "h6",
        Head => "head",
        Header => "header",
        Headers => "headers",
        Height => "height",
        Hr => "hr",
        Href => "href",
        Hreflang => "hreflang",
        Hspace => "hspace",
        Html => "html",
        HttpEquiv => "http-equiv",
        I => "i",
        Id => "id",
        Iframe => "iframe",
        Img => "img",
        Input => "input",
        Ins => "ins",
        Isindex => "isindex",
        Ismap => "ismap",
        Kbd => "kbd",
        Label => "label",
        Lang => "lang",
        Language => "language",
        Legend => "legend",
        Li => "li",
        Link => "link",
        Listing => "listing",
        Longdesc => "longdesc",
        Lowsrc => "lowsrc",
        Main => "main",
        Map => "map",
        Marginheight => "marginheight",
        Marginwidth => "marginwidth",
        Mark => "mark",
        Marquee => "marquee",
        Math => "math",
        Maxlength => "maxlength",
        Media => "media",
        Menu => "menu",
        Meta => "meta",
        Method => "method",
        Multiple => "multiple",
        Name => "name",
        Nav => "nav",
        Nobr => "nobr",
        Noembed => "noembed",
        Noframes => "noframes",
        Nohref => "nohref",
        Noscript => "noscript",
        Noshade => "noshade",
        Nowrap => "nowrap",
        Object => "object",
        Ol => "ol",
        Optgroup => "optgroup",
        Option => "option",
        P => "p",
        Param => "param",
        Plaintext => "plaintext",
        Poster => "poster",
        Pre => "pre",
        Profile => "profile",
        Q => "q",
        Readonly => "readonly",
        Rel => "rel",
        Rev => "rev",
        Rows => "rows",
        Rowspan => "rowspan",
        Rp => "rp",
        Rt => "rt",
        Ruby => "ruby",
        Rules => "rules",
        S => "s",
        Samp => "samp",
        Scope => "scope",
        Script => "script",
        Scrolling => "scrolling",
        Section => "section",
        Select => "select",
        Selected => "selected",
        Shape => "shape",
        Size => "size",
        Small => "small",
        Source => "source",
        Span => "span",
        Src => "src",
        Srcdoc => "srcdoc",
        Srcset => "srcset",
        Start => "start",
        Strike => "strike",
        Strong => "strong",
        Style => "style",
        Sub => "sub",
        Summary => "summary",
        Sup => "sup",
        Svg => "svg",
        Tabindex => "tabindex",
        Table => "table",
        Target => "target",
        Tbody => "tbody",
        Td => "td",
        Text => "text",
        Textarea => "textarea",
        Tfoot => "tfoot",
        Th => "th",
        Thead => "thead",
        Time => "time",
        Title => "title",
        Tr => "tr",
        Tt => "tt",
        Type => "type",
        U => "u",
        Ul => "ul",
        Usemap => "usemap",
        Valign => "valign",
        Value => "value",
        Var => "var",
        Version => "version",
        Video => "video",
        Vlink => "vlink",
        Vspace => "vspace",
        Wbr => "wbr",
        Width => "width",
        Xml => "xml",
        Xmlns => "xmlns",
        Xmp => "xmp",
    }
}

/// How the tokenizer reads the content of an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextKind {
    /// Markup and character references are recognized.
    Data,
    /// Only the matching end tag ends the text; no references.
    RawText,
    /// Only the matching end tag ends the text; references are decoded.
    Rcdata,
    /// Everything up to end of input is text.
    Plaintext,
}

impl HtmlName {
    /// Elements that never have content or an end tag.
    pub fn is_void(self) -> bool {
        matches!(
            self,
            HtmlName::Area
                | HtmlName::Base
                | HtmlName::Basefont
                | HtmlName::Bgsound
                | HtmlName::Br
                | HtmlName::Col
                | HtmlName::Embed
                | HtmlName::Frame
                | HtmlName::Hr
                | HtmlName::Img
                | HtmlName::Input
                | HtmlName::Isindex
                | HtmlName::Link
                | HtmlName::Meta
                | HtmlName::Param
                | HtmlName::Source
                | HtmlName::Wbr
        )
    }

    pub fn text_kind(self) -> TextKind {
        match self {
            HtmlName::Script
            | HtmlName::Style
            | HtmlName::Xmp
            | HtmlName::Iframe
            | HtmlName::Noembed
            | HtmlName::Noframes => TextKind::RawText,
            HtmlName::Title | HtmlName::Textarea => TextKind::Rcdata,
            HtmlName::Plaintext => TextKind::Plaintext,
            _ => TextKind::Data,
        }
    }

    /// Inline formatting elements that survive misnested end tags.
    pub fn is_formatting(self) -> bool {
        matches!(
            self,
            HtmlName::A
                | HtmlName::B
                | HtmlName::Big
                | HtmlName::Code
                | HtmlName::Em
                | HtmlName::Font
                | HtmlName::I
                | HtmlName::Nobr
                | HtmlName::S
                | HtmlName::Small
                | HtmlName::Strike
                | HtmlName::Strong
                | HtmlName::Tt
                | HtmlName::U
        )
    }

    /// Block-level elements around which a line break is insignificant.
    pub fn is_block(self) -> bool {
        matches!(
            self,
            HtmlName::Address
                | HtmlName::Article
                | HtmlName::Aside
                | HtmlName::Blockquote
                | HtmlName::Body
                | HtmlName::Br
                | HtmlName::Caption
                | HtmlName::Center
                | HtmlName::Col
                | HtmlName::Colgroup
                | HtmlName::Dd
                | HtmlName::Details
                | HtmlName::Dir
                | HtmlName::Div
                | HtmlName::Dl
                | HtmlName::Dt
                | HtmlName::Fieldset
                | HtmlName::Figcaption
                | HtmlName::Figure
                | HtmlName::Footer
                | HtmlName::Form
                | HtmlName::H1
                | HtmlName::H2
                | HtmlName::H3
                | HtmlName::H4
                | HtmlName::H5
                | HtmlName::H6
                | HtmlName::Head
                | HtmlName::Header
                | HtmlName::Hr
                | HtmlName::Html
                | HtmlName::Li
                | HtmlName::Link
                | HtmlName::Main
                | HtmlName::Menu
                | HtmlName::Meta
                | HtmlName::Nav
                | HtmlName::Ol
                | HtmlName::P
                | HtmlName::Section
                | HtmlName::Style
                | HtmlName::Table
                | HtmlName::Tbody
                | HtmlName::Td
                | HtmlName::Tfoot
                | HtmlName::Th
                | HtmlName::Thead
                | HtmlName::Title
                | HtmlName::Tr
                | HtmlName::Ul
        )
    }

    /// Elements whose text whitespace is significant.
    pub fn is_preformatted(self) -> bool {
        matches!(
            self,
            HtmlName::Pre
                | HtmlName::Listing
                | HtmlName::Plaintext
                | HtmlName::Textarea
                | HtmlName::Xmp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_and_attribute_names_share_one_index() {
        assert_eq!(HtmlName::from_name("STYLE"), HtmlName::Style);
        assert_eq!(HtmlName::from_name("http-equiv"), HtmlName::HttpEquiv);
        assert_eq!(HtmlName::from_name("onclick"), HtmlName::Unknown);
        assert_eq!(HtmlName::Href.as_str(), "href");
    }

    #[test]
    fn content_models() {
        assert!(HtmlName::Img.is_void());
        assert!(!HtmlName::Div.is_void());
        assert_eq!(HtmlName::Script.text_kind(), TextKind::RawText);
        assert_eq!(HtmlName::Textarea.text_kind(), TextKind::Rcdata);
        assert_eq!(HtmlName::Unknown.text_kind(), TextKind::Data);
        assert!(HtmlName::B.is_formatting());
        assert!(!HtmlName::Div.is_formatting());
    }
}
