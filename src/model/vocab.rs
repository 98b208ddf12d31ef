//! Closed vocabularies used by enumerated fields.

use std::fmt;
use std::str::FromStr;

/// Declares a vocabulary enum with its stored string form.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Every stored form, in declaration order.
            pub const VALUES: &'static [&'static str] = &[$($text,)+];

            /// The string stored in the metadata tag.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownTerm;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownTerm {
                        value: s.to_string(),
                        allowed: Self::VALUES,
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// A string that is not part of a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTerm {
    pub value: String,
    pub allowed: &'static [&'static str],
}

vocabulary! {
    /// Structural division of a book.
    pub enum SectionKind {
        Introduction => "introduction",
        Acknowledgement => "acknowledgement",
        Dedication => "dedication",
        Preface => "preface",
        Chapter => "chapter",
        ChapterGroup => "chapter_group",
        Table => "table",
        Tables => "tables",
        Appendix => "appendix",
        Appendices => "appendices",
        Glossary => "glossary",
        Index => "index",
        TableOfContents => "table_of_contents",
        Bibliography => "bibliography",
        PublishersCatalog => "publishers_catalog",
        Article => "article",
        Figure => "figure",
        Plates => "plates",
    }
}

vocabulary! {
    /// Numbering style of a section or plate.
    pub enum NumberKind {
        RomanUpper => "roman_upper",
        RomanLower => "roman_lower",
        Arabic => "arabic",
        LetterUpper => "letter_upper",
        LetterLower => "letter_lower",
    }
}

vocabulary! {
    /// How often a serial publication appears.
    pub enum PublishingFrequency {
        Once => "once",
        Yearly => "yearly",
        Quarterly => "quarterly",
        Monthly => "monthly",
        Weekly => "weekly",
        Daily => "daily",
    }
}

vocabulary! {
    /// Physical form of a graphic.
    pub enum GraphicKind {
        Figure => "figure",
        Plate => "plate",
        Table => "table",
        Frontispiece => "frontispiece",
        Photograph => "photograph",
        Map => "map",
    }
}

vocabulary! {
    /// What a graphic depicts.
    pub enum GraphicContent {
        Photograph => "photograph",
        Map => "map",
        Chart => "chart",
        Diagram => "diagram",
        Illustration => "illustration",
        TechnicalDrawing => "technical_drawing",
        Drawing => "drawing",
        Decoration => "decoration",
        Equation => "equation",
        MusicNotation => "music_notation",
    }
}

vocabulary! {
    /// Print color of a graphic.
    pub enum GraphicColor {
        Color => "color",
        Bitonal => "bitonal",
        Grayscale => "grayscale",
    }
}

vocabulary! {
    /// Label for a group of pages.
    pub enum PageKind {
        Blank => "blank",
        Title => "title",
        HalfTitle => "half_title",
        PublishingInfo => "publishing_info",
        PrintingInfo => "printing_info",
        FrontCover => "front_cover",
        BackCover => "back_cover",
        FrontJacket => "front_jacket",
        BackJacket => "back_jacket",
        FrontJacketFlap => "front_jacket_flap",
        BackJacketFlap => "back_jacket_flap",
        EndPaper => "end_paper",
        DecorativePaper => "decorative_paper",
        Frontispiece => "frontispiece",
        Illustration => "illustration",
        Photograph => "photograph",
        AdvertisementFull => "advertisement_full",
        AdvertisementPartial => "advertisement_partial",
        Equations => "equations",
        Graphics => "graphics",
    }
}
