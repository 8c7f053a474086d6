use crate::token::Token;
use crate::value::Value;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Binary {
        left: Box<Expression>,
        operator: Token,
        right: Box<Expression>,
    },
    Grouping(Box<Expression>),
    Literal(Value),
    Logical {
        left: Box<Expression>,
        operator: Token,
        right: Box<Expression>,
    },
    Unary {
        operator: Token,
        right: Box<Expression>,
    },
    Variable(Token),
    Assign {
        name: Token,
        value: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        paren: Token,
        arguments: Vec<Expression>,
    },
}

pub trait Visitor<T, Output> {
    fn visit(&mut self, n: &T) -> Output;
}

impl Expression {
    pub fn accept<T, V: Visitor<Expression, T> + ?Sized>(&self, v: &mut V) -> T {
        v.visit(self)
    }
}

#[derive(Debug, PartialEq)]
pub struct FunctionDeclaration {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Print {
        keyword: Token,
        value: Expression,
    },
    Expression(Expression),
    Var {
        name: Token,
        initializer: Option<Expression>,
    },
    Block(Vec<Statement>),
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
    },
    Function(Rc<FunctionDeclaration>),
    Return {
        keyword: Token,
        value: Option<Expression>,
    },
}

impl Statement {
    pub fn accept<T, V: Visitor<Statement, T> + ?Sized>(&self, v: &mut V) -> T {
        v.visit(self)
    }
}

/// Renders trees as parenthesized prefix expressions, e.g. `(+ 1 (* 2 3))`.
pub struct AstPrinter {}

impl AstPrinter {
    pub fn print(expression: &Expression) -> String {
        expression.accept(&mut AstPrinter {})
    }
    pub fn print_statement(statement: &Statement) -> String {
        statement.accept(&mut AstPrinter {})
    }
    fn parenthesize(&mut self, name: &str, args: &[&Expression]) -> String {
        let mut x = String::from("(");
        x.push_str(name);
        for arg in args {
            x.push(' ');
            x.push_str(arg.accept(self).as_str());
        }
        x.push(')');
        x
    }
    fn block(&mut self, head: &str, statements: &[Statement]) -> String {
        let mut x = String::from("(");
        x.push_str(head);
        for statement in statements {
            x.push(' ');
            x.push_str(statement.accept(self).as_str());
        }
        x.push(')');
        x
    }
}

impl Visitor<Expression, String> for AstPrinter {
    fn visit(&mut self, n: &Expression) -> String {
        match n {
            Expression::Binary {
                left,
                operator,
                right,
            } => self.parenthesize(&operator.lexeme, &[left, right]),
            Expression::Grouping(x) => self.parenthesize("group", &[x]),
            Expression::Literal(x) => x.to_string(),
            Expression::Unary { operator, right } => {
                self.parenthesize(&operator.lexeme, &[right])
            }
            Expression::Variable(x) => x.lexeme.clone(),
            Expression::Assign { name, value } => {
                format!("(assign {} {})", name.lexeme, value.accept(self))
            }
            Expression::Logical {
                left,
                operator,
                right,
            } => self.parenthesize(&operator.lexeme, &[left, right]),
            Expression::Call {
                callee, arguments, ..
            } => {
                let mut args: Vec<&Expression> = vec![&**callee];
                args.extend(arguments.iter());
                self.parenthesize("call", &args)
            }
        }
    }
}

impl Visitor<Statement, String> for AstPrinter {
    fn visit(&mut self, n: &Statement) -> String {
        match n {
            Statement::Print { value, .. } => self.parenthesize("print", &[value]),
            Statement::Expression(x) => self.parenthesize(";", &[x]),
            Statement::Var { name, initializer } => match initializer {
                Some(x) => format!("(var {} {})", name.lexeme, x.accept(self)),
                None => format!("(var {})", name.lexeme),
            },
            Statement::Block(statements) => self.block("block", statements),
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    condition.accept(self),
                    then_branch.accept(self),
                    else_branch.accept(self)
                ),
                None => format!("(if {} {})", condition.accept(self), then_branch.accept(self)),
            },
            Statement::While { condition, body } => {
                format!("(while {} {})", condition.accept(self), body.accept(self))
            }
            Statement::Function(declaration) => {
                let params: Vec<&str> = declaration
                    .params
                    .iter()
                    .map(|p| p.lexeme.as_str())
                    .collect();
                let head = format!("fun {} ({})", declaration.name.lexeme, params.join(" "));
                self.block(&head, &declaration.body)
            }
            Statement::Return { value, .. } => match value {
                Some(x) => self.parenthesize("return", &[x]),
                None => String::from("(return)"),
            },
        }
    }
}

#[cfg(test)]
mod ast_tests {
    use crate::ast::{AstPrinter, Expression, Statement};
    use crate::token::{Token, TokenType};
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn basic_ast_test() {
        let expression = Expression::Binary {
            left: Box::new(Expression::Unary {
                operator: Token::new(TokenType::Minus, "-", 1, 1),
                right: Box::new(Expression::Literal(Value::Number(123.0))),
            }),
            operator: Token::new(TokenType::Star, "*", 1, 6),
            right: Box::new(Expression::Grouping(Box::new(Expression::Literal(
                Value::Number(45.67),
            )))),
        };
        assert_eq!(AstPrinter::print(&expression), "(* (- 123) (group 45.67))");
    }

    #[test]
    fn statements() {
        let statement = Statement::If {
            condition: Expression::Variable(Token::new(TokenType::Identifier, "ok", 1, 5)),
            then_branch: Box::new(Statement::Print {
                keyword: Token::new(TokenType::Print, "print", 1, 9),
                value: Expression::Literal(Value::String("yes".to_string())),
            }),
            else_branch: None,
        };
        assert_eq!(AstPrinter::print_statement(&statement), "(if ok (print yes))");
    }
}
