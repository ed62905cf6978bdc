use crate::{
    MemoryError,
    lexer::{Lexer, Token},
};
use cqltable_core::value::Value;

///
/// Statement
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Statement {
    CreateKeyspace {
        name: String,
    },
    DropKeyspace {
        name: String,
    },
    CreateTable {
        table: TableName,
        columns: Vec<String>,
        partition_keys: Vec<String>,
        clustering_keys: Vec<String>,
        descending: Vec<String>,
    },
    DropTable {
        table: TableName,
    },
    Insert {
        table: TableName,
        columns: Vec<String>,
        values: Vec<Term>,
        ttl: Option<Term>,
    },
    Update {
        table: TableName,
        assignments: Vec<(String, Term)>,
        filter: Vec<Relation>,
    },
    Delete {
        table: TableName,
        filter: Vec<Relation>,
    },
    Select {
        table: TableName,
        columns: Option<Vec<String>>,
        filter: Vec<Relation>,
        order: Vec<(String, bool)>,
        limit: Option<usize>,
        allow_filtering: bool,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TableName {
    pub keyspace: Option<String>,
    pub name: String,
}

/// Positional parameter or inline literal.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Term {
    Param(usize),
    Literal(Value),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RelOp {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
}

impl RelOp {
    pub(crate) const fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::In)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Relation {
    pub column: String,
    pub op: RelOp,
    pub terms: Vec<Term>,
}

pub(crate) fn parse_statement(input: &str) -> Result<Statement, MemoryError> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        params: 0,
    };

    let statement = parser.statement()?;
    parser.eat_symbol(';');
    parser.expect_eof()?;

    Ok(statement)
}

static EOF: Token = Token::Eof;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    params: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&EOF)
    }

    fn next(&mut self) -> Token {
        let token = self.peek().clone();
        if token != Token::Eof {
            self.pos += 1;
        }
        token
    }

    fn error<T>(&self, expected: &str) -> Result<T, MemoryError> {
        Err(MemoryError::Syntax(format!(
            "expected {expected}, found {:?}",
            self.peek()
        )))
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let found = self.is_keyword(keyword);
        if found {
            self.pos += 1;
        }
        found
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), MemoryError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            self.error(keyword)
        }
    }

    fn eat_symbol(&mut self, symbol: char) -> bool {
        let found = *self.peek() == Token::Symbol(symbol);
        if found {
            self.pos += 1;
        }
        found
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<(), MemoryError> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            self.error(&format!("'{symbol}'"))
        }
    }

    fn expect_eof(&self) -> Result<(), MemoryError> {
        if *self.peek() == Token::Eof {
            Ok(())
        } else {
            self.error("end of statement")
        }
    }

    // quoted identifiers keep their case; bare ones fold to lower case
    fn ident(&mut self) -> Result<String, MemoryError> {
        match self.peek().clone() {
            Token::Quoted(name) => {
                self.pos += 1;
                Ok(name)
            }
            Token::Word(word) => {
                self.pos += 1;
                Ok(word.to_lowercase())
            }
            _ => self.error("identifier"),
        }
    }

    fn ident_list(&mut self) -> Result<Vec<String>, MemoryError> {
        let mut names = vec![self.ident()?];
        while self.eat_symbol(',') {
            names.push(self.ident()?);
        }
        Ok(names)
    }

    fn table_name(&mut self) -> Result<TableName, MemoryError> {
        let first = self.ident()?;
        if self.eat_symbol('.') {
            Ok(TableName {
                keyspace: Some(first),
                name: self.ident()?,
            })
        } else {
            Ok(TableName {
                keyspace: None,
                name: first,
            })
        }
    }

    fn term(&mut self) -> Result<Term, MemoryError> {
        let term = match self.peek().clone() {
            Token::Placeholder => {
                self.params += 1;
                Term::Param(self.params - 1)
            }
            Token::Str(s) => Term::Literal(Value::Text(s)),
            Token::Number(n) => Term::Literal(number(&n)?),
            Token::Word(w) if w.eq_ignore_ascii_case("true") => Term::Literal(Value::Bool(true)),
            Token::Word(w) if w.eq_ignore_ascii_case("false") => Term::Literal(Value::Bool(false)),
            Token::Word(w) if w.eq_ignore_ascii_case("null") => Term::Literal(Value::Null),
            _ => return self.error("value"),
        };
        self.pos += 1;

        Ok(term)
    }

    fn statement(&mut self) -> Result<Statement, MemoryError> {
        if self.eat_keyword("CREATE") {
            if self.eat_keyword("KEYSPACE") {
                return self.create_keyspace();
            }
            self.expect_keyword("TABLE")?;
            return self.create_table();
        }
        if self.eat_keyword("DROP") {
            if self.eat_keyword("KEYSPACE") {
                return Ok(Statement::DropKeyspace { name: self.ident()? });
            }
            self.expect_keyword("TABLE")?;
            return Ok(Statement::DropTable {
                table: self.table_name()?,
            });
        }
        if self.eat_keyword("INSERT") {
            return self.insert();
        }
        if self.eat_keyword("UPDATE") {
            return self.update();
        }
        if self.eat_keyword("DELETE") {
            self.expect_keyword("FROM")?;
            let table = self.table_name()?;
            let filter = self.where_clause()?;
            return Ok(Statement::Delete { table, filter });
        }
        if self.eat_keyword("SELECT") {
            return self.select();
        }

        self.error("statement")
    }

    // replication options are accepted and ignored
    fn create_keyspace(&mut self) -> Result<Statement, MemoryError> {
        let name = self.ident()?;
        while *self.peek() != Token::Eof && *self.peek() != Token::Symbol(';') {
            self.pos += 1;
        }

        Ok(Statement::CreateKeyspace { name })
    }

    fn create_table(&mut self) -> Result<Statement, MemoryError> {
        let table = self.table_name()?;
        let mut columns = Vec::new();
        let mut primary_key: Option<(Vec<String>, Vec<String>)> = None;

        self.expect_symbol('(')?;
        loop {
            if self.eat_keyword("PRIMARY") {
                self.expect_keyword("KEY")?;
                primary_key = Some(self.primary_key()?);
            } else {
                let column = self.ident()?;
                self.skip_type()?;
                if self.eat_keyword("PRIMARY") {
                    self.expect_keyword("KEY")?;
                    primary_key = Some((vec![column.clone()], Vec::new()));
                }
                columns.push(column);
            }

            if !self.eat_symbol(',') {
                break;
            }
        }
        self.expect_symbol(')')?;

        let Some((partition_keys, clustering_keys)) = primary_key else {
            return Err(MemoryError::Invalid("no PRIMARY KEY specified".to_string()));
        };

        let mut descending = Vec::new();
        if self.eat_keyword("WITH") {
            loop {
                if self.eat_keyword("CLUSTERING") {
                    self.expect_keyword("ORDER")?;
                    self.expect_keyword("BY")?;
                    self.expect_symbol('(')?;
                    for (column, desc) in self.order_list()? {
                        if desc {
                            descending.push(column);
                        }
                    }
                    self.expect_symbol(')')?;
                } else {
                    // other table properties are accepted and ignored
                    while !self.is_keyword("AND")
                        && *self.peek() != Token::Eof
                        && *self.peek() != Token::Symbol(';')
                    {
                        self.pos += 1;
                    }
                }

                if !self.eat_keyword("AND") {
                    break;
                }
            }
        }

        Ok(Statement::CreateTable {
            table,
            columns,
            partition_keys,
            clustering_keys,
            descending,
        })
    }

    // ((p1, p2), c1, c2) or (p, c1, c2)
    fn primary_key(&mut self) -> Result<(Vec<String>, Vec<String>), MemoryError> {
        self.expect_symbol('(')?;

        let partition = if self.eat_symbol('(') {
            let keys = self.ident_list()?;
            self.expect_symbol(')')?;
            keys
        } else {
            vec![self.ident()?]
        };

        let mut clustering = Vec::new();
        while self.eat_symbol(',') {
            clustering.push(self.ident()?);
        }
        self.expect_symbol(')')?;

        Ok((partition, clustering))
    }

    // column types are not checked; skip `text`, `list<text>`, `map<text, int>`
    fn skip_type(&mut self) -> Result<(), MemoryError> {
        let Token::Word(_) = self.next() else {
            return self.error("column type");
        };

        if *self.peek() == Token::Op("<") {
            let mut depth = 0_usize;
            loop {
                match self.next() {
                    Token::Op("<") => depth += 1,
                    Token::Op(">") => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    Token::Eof => return self.error("'>'"),
                    _ => {}
                }
            }
        }

        Ok(())
    }

    fn insert(&mut self) -> Result<Statement, MemoryError> {
        self.expect_keyword("INTO")?;
        let table = self.table_name()?;

        self.expect_symbol('(')?;
        let columns = self.ident_list()?;
        self.expect_symbol(')')?;

        self.expect_keyword("VALUES")?;
        self.expect_symbol('(')?;
        let mut values = vec![self.term()?];
        while self.eat_symbol(',') {
            values.push(self.term()?);
        }
        self.expect_symbol(')')?;

        let ttl = if self.eat_keyword("USING") {
            self.expect_keyword("TTL")?;
            Some(self.term()?)
        } else {
            None
        };

        Ok(Statement::Insert {
            table,
            columns,
            values,
            ttl,
        })
    }

    fn update(&mut self) -> Result<Statement, MemoryError> {
        let table = self.table_name()?;
        self.expect_keyword("SET")?;

        let mut assignments = Vec::new();
        loop {
            let column = self.ident()?;
            if self.next() != Token::Op("=") {
                return self.error("'='");
            }
            assignments.push((column, self.term()?));

            if !self.eat_symbol(',') {
                break;
            }
        }

        let filter = self.where_clause()?;

        Ok(Statement::Update {
            table,
            assignments,
            filter,
        })
    }

    fn select(&mut self) -> Result<Statement, MemoryError> {
        let columns = if self.eat_symbol('*') {
            None
        } else {
            Some(self.ident_list()?)
        };

        self.expect_keyword("FROM")?;
        let table = self.table_name()?;
        let filter = self.where_clause()?;

        let order = if self.eat_keyword("ORDER") {
            self.expect_keyword("BY")?;
            self.order_list()?
        } else {
            Vec::new()
        };

        let limit = if self.eat_keyword("LIMIT") {
            match self.next() {
                Token::Number(n) => Some(
                    n.parse()
                        .map_err(|_| MemoryError::Syntax(format!("invalid LIMIT {n}")))?,
                ),
                _ => return self.error("row limit"),
            }
        } else {
            None
        };

        let allow_filtering = if self.eat_keyword("ALLOW") {
            self.expect_keyword("FILTERING")?;
            true
        } else {
            false
        };

        Ok(Statement::Select {
            table,
            columns,
            filter,
            order,
            limit,
            allow_filtering,
        })
    }

    fn order_list(&mut self) -> Result<Vec<(String, bool)>, MemoryError> {
        let mut order = Vec::new();
        loop {
            let column = self.ident()?;
            let desc = if self.eat_keyword("DESC") {
                true
            } else {
                self.eat_keyword("ASC");
                false
            };
            order.push((column, desc));

            if !self.eat_symbol(',') {
                return Ok(order);
            }
        }
    }

    fn where_clause(&mut self) -> Result<Vec<Relation>, MemoryError> {
        let mut relations = Vec::new();
        if !self.eat_keyword("WHERE") {
            return Ok(relations);
        }

        loop {
            relations.push(self.relation()?);
            if !self.eat_keyword("AND") {
                return Ok(relations);
            }
        }
    }

    fn relation(&mut self) -> Result<Relation, MemoryError> {
        let column = self.ident()?;

        if self.eat_keyword("IN") {
            self.expect_symbol('(')?;
            let mut terms = vec![self.term()?];
            while self.eat_symbol(',') {
                terms.push(self.term()?);
            }
            self.expect_symbol(')')?;

            return Ok(Relation {
                column,
                op: RelOp::In,
                terms,
            });
        }

        let op = match self.next() {
            Token::Op("=") => RelOp::Eq,
            Token::Op("<") => RelOp::Lt,
            Token::Op("<=") => RelOp::Lte,
            Token::Op(">") => RelOp::Gt,
            Token::Op(">=") => RelOp::Gte,
            _ => return self.error("comparison operator"),
        };

        Ok(Relation {
            column,
            op,
            terms: vec![self.term()?],
        })
    }
}

fn number(text: &str) -> Result<Value, MemoryError> {
    let parsed = if text.contains('.') {
        text.parse().ok().map(Value::Double)
    } else {
        text.parse().ok().map(Value::BigInt)
    };

    parsed.ok_or_else(|| MemoryError::Syntax(format!("invalid number {text}")))
}
