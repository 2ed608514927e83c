//! Built-in grammars for the default host and embedded languages

use super::error::GrammarSourceError;
use super::model::Grammar;

pub const HTML: &str = "HTML";
pub const CSS: &str = "CSS";
pub const JAVASCRIPT: &str = "JavaScript";

pub const HTML_SOURCE: &str = r##"
grammar HTML;

document  : node* ;
node      : element | text | comment | doctype ;
element   : '<' TAG_NAME attribute* '>' node* '</' TAG_NAME '>'
          | '<' TAG_NAME attribute* '/>' ;
attribute : ATTR_NAME ( '=' ATTR_VALUE )? ;
text      : TEXT ;
comment   : COMMENT ;
doctype   : DOCTYPE ;

COMMENT    : /<!--[\s\S]*?-->/ ;
DOCTYPE    : /<![A-Za-z][^>]*>/ ;
CLOSE_OPEN : '</' ;
SELF_CLOSE : '/>' ;
TAG_OPEN   : '<' ;
TAG_CLOSE  : '>' ;
EQUALS     : '=' ;
ATTR_VALUE : /"[^"]*"|'[^']*'/ ;
TAG_NAME   : /[A-Za-z][A-Za-z0-9-]*/ ;
ATTR_NAME  : /[^\s"'>\/=]+/ ;
TEXT       : /[^<]+/ ;
"##;

pub const CSS_SOURCE: &str = r##"
grammar CSS;

stylesheet    : statement* ;
statement     : rule_set | at_rule ;
rule_set      : selector_list '{' declaration* '}' ;
selector_list : selector ( ',' selector )* ;
selector      : compound ( combinator? compound )* ;
compound      : TYPE_SELECTOR | ID_SELECTOR | CLASS_SELECTOR | '*' | pseudo ;
combinator    : '>' | '+' | '~' ;
pseudo        : ':' IDENT | '::' IDENT ;
declaration   : IDENT ':' value ';'? ;
value         : ( IDENT | NUMBER | STRING | HASH | FUNCTION )+ ;
at_rule       : AT_KEYWORD prelude ( '{' statement* '}' | ';' ) ;
prelude       : ( IDENT | NUMBER | STRING | '(' | ')' | ':' | ',' )* ;

COMMENT        : /\/\*[\s\S]*?\*\// ;
AT_KEYWORD     : /@[A-Za-z-]+/ ;
ID_SELECTOR    : /#[A-Za-z_][\w-]*/ ;
HASH           : /#[0-9A-Fa-f]+/ ;
CLASS_SELECTOR : /\.[A-Za-z_][\w-]*/ ;
FUNCTION       : /[A-Za-z-]+\(/ ;
NUMBER         : /-?[0-9]+(?:\.[0-9]+)?(?:%|[A-Za-z]+)?/ ;
STRING         : /"[^"]*"|'[^']*'/ ;
IDENT          : /-?[A-Za-z_][\w-]*/ ;
TYPE_SELECTOR  : /[A-Za-z][\w-]*/ ;
PUNCT          : /[{}:;,>+~*()\[\]=]/ ;
"##;

pub const JAVASCRIPT_SOURCE: &str = r##"
grammar JavaScript;

program              : statement* ;
statement            : declaration | expression_statement | block | control ;
declaration          : function_declaration | variable_declaration ;
function_declaration : 'function' IDENTIFIER '(' parameters? ')' block ;
variable_declaration : ( 'var' | 'let' | 'const' ) IDENTIFIER ( '=' expression )? ';'? ;
parameters           : IDENTIFIER ( ',' IDENTIFIER )* ;
block                : '{' statement* '}' ;
control              : ( 'if' | 'while' | 'for' ) '(' expression ')' statement ;
expression_statement : expression ';'? ;
expression           : primary ( OPERATOR primary )* ;
primary              : IDENTIFIER | NUMBER | STRING | call | '(' expression ')' ;
call                 : primary '(' arguments? ')' ;
arguments            : expression ( ',' expression )* ;

COMMENT    : /\/\/[^\n]*|\/\*[\s\S]*?\*\// ;
KEYWORD    : /(?:function|var|let|const|return|if|else|for|while|new|this|typeof)\b/ ;
IDENTIFIER : /[A-Za-z_$][\w$]*/ ;
NUMBER     : /[0-9]+(?:\.[0-9]+)?/ ;
STRING     : /"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|`(?:[^`\\]|\\.)*`/ ;
OPERATOR   : /===|!==|=>|==|!=|<=|>=|&&|\|\||[-+*\/%=<>!&|^~?:.]/ ;
PUNCT      : /[{}()\[\];,]/ ;
"##;

pub fn html() -> Result<Grammar, GrammarSourceError> {
    Grammar::parse_source(HTML_SOURCE)
}

pub fn css() -> Result<Grammar, GrammarSourceError> {
    Grammar::parse_source(CSS_SOURCE)
}

pub fn javascript() -> Result<Grammar, GrammarSourceError> {
    Grammar::parse_source(JAVASCRIPT_SOURCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::InheritanceResolver;

    #[test]
    fn test_builtin_sources_parse_and_resolve() {
        let mut resolver = InheritanceResolver::new();
        for grammar in [html(), css(), javascript()] {
            resolver.register_grammar(grammar.unwrap()).unwrap();
        }

        for name in [HTML, CSS, JAVASCRIPT] {
            let effective = resolver.resolve(name).unwrap();
            assert!(effective.rule_count() > 0, "{} has no rules", name);
            assert!(effective.token_count() > 0, "{} has no tokens", name);
        }
    }

    #[test]
    fn test_builtin_token_patterns() {
        let css = css().unwrap();
        assert!(css.tokens().contains_key("ID_SELECTOR"));
        assert_eq!(css.rule("combinator").unwrap().alternatives, vec!["'>'", "'+'", "'~'"]);

        let mut resolver = InheritanceResolver::new();
        resolver.register_grammar(javascript().unwrap()).unwrap();
        let js = resolver.resolve(JAVASCRIPT).unwrap();
        let tokens = js.tokenizer().tokenize("function go(a) { return a === 'x'; }").tokens;
        assert_eq!(tokens[0].kind, "KEYWORD");
        assert_eq!(tokens[1].kind, "IDENTIFIER");
        assert!(tokens.iter().any(|t| t.kind == "STRING"));
    }
}
