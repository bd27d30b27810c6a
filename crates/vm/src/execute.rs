//! Main execution loop and instruction bodies.

use crate::error::RuntimeError;
use crate::machine::Machine;
use hoc_common::{Address, Binding, BranchTargets, Instruction, LoopTargets, Operand, SymbolId};
use std::fmt;
use std::io::Write;
use tracing::{debug, trace};

/// `%.6f` rendering: six decimals, C spellings for NaN and infinities.
struct Fixed(f64);

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        let sign = if v.is_sign_negative() { "-" } else { "" };
        if v.is_nan() {
            write!(f, "{sign}nan")
        } else if v.is_infinite() {
            write!(f, "{sign}inf")
        } else {
            write!(f, "{v:.6}")
        }
    }
}

fn truth(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

impl<W: Write> Machine<W> {
    /// Run the code starting at `start` until a STOP is fetched.
    ///
    /// Re-entrant: WHILE and IF call back into `execute` for their
    /// condition and branches, then set the program counter to their own
    /// continuation so the enclosing invocation resumes there. When this
    /// returns normally the program counter is left on the STOP.
    pub fn execute(&mut self, start: Address) -> Result<(), RuntimeError> {
        self.pc = start;

        loop {
            let instr = *self
                .code
                .get(self.pc)
                .ok_or(RuntimeError::UnexpectedEndOfProgram { at: self.pc })?;
            if instr.is_stop() {
                return Ok(());
            }

            self.current = self.pc;
            self.pc += 1;
            trace!(
                at = self.current,
                op = instr.mnemonic(),
                depth = self.stack.len(),
                "dispatch"
            );
            self.dispatch(instr)?;
        }
    }

    /// Run a single instruction body against the current stack.
    ///
    /// Inline operands come from the record itself; control-flow records
    /// read their condition from the slot after the program counter.
    pub fn dispatch(&mut self, instr: Instruction) -> Result<(), RuntimeError> {
        match instr {
            Instruction::Stop => {}
            Instruction::Pop => {
                self.pop()?;
            }

            // Variables
            Instruction::ConstPush(id) => {
                let value = self.value_of(id)?;
                self.push(Operand::Number(value))?;
            }
            Instruction::VarPush(id) => self.push(Operand::Symbol(id))?,
            Instruction::Eval => self.exec_eval()?,
            Instruction::Assign => self.exec_assign()?,

            // Arithmetic
            Instruction::Add => self.exec_binary(|a, b| a + b)?,
            Instruction::Sub => self.exec_binary(|a, b| a - b)?,
            Instruction::Mul => self.exec_binary(|a, b| a * b)?,
            Instruction::Div => self.exec_div()?,
            Instruction::Pow => self.exec_binary(f64::powf)?,
            Instruction::Negate => self.exec_unary(|a| -a)?,

            // Relational
            Instruction::Gt => self.exec_binary(|a, b| truth(a > b))?,
            Instruction::Lt => self.exec_binary(|a, b| truth(a < b))?,
            Instruction::Ge => self.exec_binary(|a, b| truth(a >= b))?,
            Instruction::Le => self.exec_binary(|a, b| truth(a <= b))?,
            Instruction::Eq => self.exec_binary(|a, b| truth(a == b))?,
            Instruction::Ne => self.exec_binary(|a, b| truth(a != b))?,

            // Logical: both sides are always evaluated
            Instruction::And => self.exec_binary(|a, b| truth(a != 0.0 && b != 0.0))?,
            Instruction::Or => self.exec_binary(|a, b| truth(a != 0.0 || b != 0.0))?,
            Instruction::Not => self.exec_unary(|a| truth(a == 0.0))?,

            Instruction::Bltin(func) => self.exec_unary(|x| func.call(x))?,

            Instruction::Print => {
                let value = self.pop_number()?;
                self.write_line(format_args!("\t{}", Fixed(value)))?;
            }
            Instruction::PrExpr => {
                let value = self.pop_number()?;
                self.write_line(format_args!("{}", Fixed(value)))?;
            }

            Instruction::While(targets) => self.exec_while(targets)?,
            Instruction::If(targets) => self.exec_if(targets)?,
        }
        Ok(())
    }

    /// Numeric value of a symbol.
    fn value_of(&self, id: SymbolId) -> Result<f64, RuntimeError> {
        let sym = self.symbol(id)?;
        match sym.binding() {
            Binding::Variable(v) => Ok(*v),
            Binding::Undefined => Err(RuntimeError::UndefinedVariable {
                name: sym.name().to_string(),
            }),
            Binding::Builtin(_) => Err(RuntimeError::NotANumber {
                name: sym.name().to_string(),
            }),
        }
    }

    fn exec_eval(&mut self) -> Result<(), RuntimeError> {
        let id = self.pop_symbol()?;
        let value = self.value_of(id)?;
        self.push(Operand::Number(value))
    }

    /// Value on top, target reference beneath it. Pushes the value back so
    /// assignments chain.
    fn exec_assign(&mut self) -> Result<(), RuntimeError> {
        let value = self.pop_number()?;
        let id = self.pop_symbol()?;
        self.symbol_mut(id)?.assign(value)?;
        self.push(Operand::Number(value))
    }

    /// Right operand is on top.
    fn exec_binary(&mut self, op: impl Fn(f64, f64) -> f64) -> Result<(), RuntimeError> {
        let b = self.pop_number()?;
        let a = self.pop_number()?;
        self.push(Operand::Number(op(a, b)))
    }

    fn exec_unary(&mut self, op: impl Fn(f64) -> f64) -> Result<(), RuntimeError> {
        let a = self.pop_number()?;
        self.push(Operand::Number(op(a)))
    }

    fn exec_div(&mut self) -> Result<(), RuntimeError> {
        let b = self.pop_number()?;
        if b == 0.0 {
            return Err(RuntimeError::DivisionByZero { at: self.current });
        }
        let a = self.pop_number()?;
        self.push(Operand::Number(a / b))
    }

    fn write_line(&mut self, args: fmt::Arguments<'_>) -> Result<(), RuntimeError> {
        writeln!(self.out, "{args}").map_err(|e| RuntimeError::Output {
            message: e.to_string(),
        })
    }

    /// Run a sub-program on behalf of the control record at `owner`.
    ///
    /// Afterwards, error reports point at the owner again rather than at
    /// the last instruction the sub-program ran.
    fn execute_nested(&mut self, start: Address, owner: Address) -> Result<(), RuntimeError> {
        self.execute(start)?;
        self.current = owner;
        Ok(())
    }

    /// Condition starts at the slot after the record; loop until it pops zero.
    fn exec_while(&mut self, targets: LoopTargets) -> Result<(), RuntimeError> {
        let at = self.current;
        let condition = self.pc;
        let (Some(body), Some(next)) = (targets.body, targets.next) else {
            return Err(RuntimeError::UnresolvedTarget { at });
        };

        self.execute_nested(condition, at)?;
        let mut iterations = 0usize;
        while self.pop_number()? != 0.0 {
            self.execute_nested(body, at)?;
            self.execute_nested(condition, at)?;
            iterations += 1;
        }

        debug!(at, iterations, next, "while finished");
        self.pc = next;
        Ok(())
    }

    /// Condition starts at the slot after the record; run at most one branch.
    fn exec_if(&mut self, targets: BranchTargets) -> Result<(), RuntimeError> {
        let at = self.current;
        let condition = self.pc;
        let (Some(then), Some(next)) = (targets.then, targets.next) else {
            return Err(RuntimeError::UnresolvedTarget { at });
        };

        self.execute_nested(condition, at)?;
        let taken = self.pop_number()? != 0.0;
        if taken {
            self.execute_nested(then, at)?;
        } else if let Some(otherwise) = targets.otherwise {
            self.execute_nested(otherwise, at)?;
        }

        debug!(at, taken, next, "if finished");
        self.pc = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> Machine<Vec<u8>> {
        Machine::with_output(Vec::new())
    }

    fn num(m: &mut Machine<Vec<u8>>, v: f64) {
        m.push(Operand::Number(v)).unwrap();
    }

    #[test]
    fn sub_uses_top_as_right_operand() {
        let mut m = machine();
        num(&mut m, 10.0);
        num(&mut m, 4.0);
        m.dispatch(Instruction::Sub).unwrap();
        assert_eq!(m.stack(), &[Operand::Number(6.0)]);
    }

    #[test]
    fn div_by_zero_pushes_nothing() {
        let mut m = machine();
        num(&mut m, 1.0);
        num(&mut m, 0.0);
        assert_eq!(
            m.dispatch(Instruction::Div),
            Err(RuntimeError::DivisionByZero { at: 0 })
        );
        // Only the left operand remains; no result was pushed.
        assert_eq!(m.stack(), &[Operand::Number(1.0)]);
    }

    #[test]
    fn not_of_zero_and_nonzero() {
        let mut m = machine();
        num(&mut m, 0.0);
        m.dispatch(Instruction::Not).unwrap();
        num(&mut m, -2.0);
        m.dispatch(Instruction::Not).unwrap();
        assert_eq!(m.stack(), &[Operand::Number(1.0), Operand::Number(0.0)]);
    }

    #[test]
    fn eval_undefined_pushes_nothing() {
        let mut m = machine();
        let id = m.install("ghost", Binding::Undefined).unwrap();
        m.push(Operand::Symbol(id)).unwrap();
        assert_eq!(
            m.dispatch(Instruction::Eval),
            Err(RuntimeError::UndefinedVariable {
                name: "ghost".to_string()
            })
        );
        assert!(m.stack().is_empty());
    }

    #[test]
    fn constpush_of_builtin_is_not_a_number() {
        let mut m = machine();
        m.install_defaults().unwrap();
        let sin = m.lookup("sin").unwrap();
        assert_eq!(
            m.dispatch(Instruction::ConstPush(sin)),
            Err(RuntimeError::NotANumber {
                name: "sin".to_string()
            })
        );
    }

    #[test]
    fn execute_past_end_without_stop() {
        let mut m = machine();
        m.emit(Instruction::Pop).unwrap();
        num(&mut m, 1.0);
        assert_eq!(
            m.execute(0),
            Err(RuntimeError::UnexpectedEndOfProgram { at: 1 })
        );
    }

    #[test]
    fn execute_leaves_pc_on_stop() {
        let mut m = machine();
        m.emit(Instruction::Pop).unwrap();
        m.emit(Instruction::Stop).unwrap();
        num(&mut m, 1.0);
        m.execute(0).unwrap();
        assert_eq!(m.pc(), 1);
    }

    #[test]
    fn unpatched_while_is_rejected() {
        let mut m = machine();
        m.emit(Instruction::while_unresolved()).unwrap();
        m.emit(Instruction::Stop).unwrap();
        assert_eq!(
            m.execute(0),
            Err(RuntimeError::UnresolvedTarget { at: 0 })
        );
    }

    #[test]
    fn print_formats() {
        let mut m = machine();
        num(&mut m, 2.5);
        m.dispatch(Instruction::Print).unwrap();
        num(&mut m, -1.0);
        m.dispatch(Instruction::PrExpr).unwrap();
        let out = String::from_utf8(m.into_output()).unwrap();
        assert_eq!(out, "\t2.500000\n-1.000000\n");
    }

    #[test]
    fn non_finite_values_print_like_c() {
        let mut m = machine();
        for v in [f64::NAN, -f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            num(&mut m, v);
            m.dispatch(Instruction::PrExpr).unwrap();
        }
        num(&mut m, f64::INFINITY);
        m.dispatch(Instruction::Print).unwrap();
        let out = String::from_utf8(m.into_output()).unwrap();
        assert_eq!(out, "nan\n-nan\ninf\n-inf\n\tinf\n");
    }

    #[test]
    fn negative_zero_keeps_its_sign() {
        let mut m = machine();
        num(&mut m, -0.0);
        m.dispatch(Instruction::PrExpr).unwrap();
        assert_eq!(m.into_output(), b"-0.000000\n");
    }

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_output_error() {
        let mut m = Machine::with_output(Closed);
        m.push(Operand::Number(1.0)).unwrap();
        assert_eq!(
            m.dispatch(Instruction::PrExpr),
            Err(RuntimeError::Output {
                message: "closed".to_string()
            })
        );
    }
}
