pub mod compile_time {
    pub mod grammar {
        /// Maximum number of grammars a single resolver will hold
        /// SECURITY: Bounds registry growth from repeated registration
        pub const MAX_REGISTERED_GRAMMARS: usize = 256;

        /// Maximum length of an inheritance chain (root to leaf)
        /// SECURITY: Prevents stack exhaustion in recursive resolution
        pub const MAX_INHERITANCE_DEPTH: usize = 32;

        /// Maximum number of production rules in one effective grammar
        /// RESOURCE: Bounds flattening cost for wide hierarchies
        pub const MAX_EFFECTIVE_RULES: usize = 10_000;

        /// Maximum size of raw grammar source text (1MB)
        pub const MAX_GRAMMAR_SOURCE_SIZE: usize = 1_048_576;
    }

    pub mod context {
        /// Maximum context stack depth, root included
        /// SECURITY: Prevents DoS via deeply nested embedded regions
        pub const MAX_CONTEXT_STACK_DEPTH: usize = 64;

        /// Maximum number of context triggers across all languages
        pub const MAX_CONTEXT_TRIGGERS: usize = 512;

        /// Maximum document size accepted by a single parse (16MB)
        /// SECURITY: Callers bound input, this is the last line
        pub const MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

        /// Maximum markup element nesting inside one context
        pub const MAX_ELEMENT_NESTING: usize = 512;
    }

    pub mod symbols {
        /// Maximum number of symbols recorded during one parse
        /// SECURITY: Prevents DoS via symbol table explosion
        pub const MAX_SYMBOLS_PER_PARSE: usize = 100_000;

        /// Maximum number of scopes created during one parse
        pub const MAX_SCOPES_PER_PARSE: usize = 10_000;

        /// Maximum occurrences tracked per symbol
        /// RESOURCE: Further occurrences are dropped
        pub const MAX_OCCURRENCES_PER_SYMBOL: usize = 1_000;
    }

    pub mod validation {
        /// Maximum cross-references collected during one parse
        pub const MAX_CROSS_REFERENCES: usize = 50_000;

        /// Maximum findings (errors + warnings) reported by one validation run
        /// RESOURCE: Controls output size for pathological documents
        pub const MAX_FINDINGS: usize = 10_000;

        /// Maximum edit distance for a name to be offered as a suggestion
        pub const MAX_SUGGESTION_DISTANCE: usize = 3;
    }

    pub mod logging {
        /// Memory logger buffer size
        /// RESOURCE: Oldest events are dropped past this size
        pub const LOG_BUFFER_SIZE: usize = 10_000;

        /// Maximum log message length
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 4_096;
    }
}
