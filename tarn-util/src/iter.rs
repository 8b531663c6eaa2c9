/// One step of a depth-first walk over a tree of `S`.
#[derive(Debug)]
pub enum Step<'a, S, A> {
    Yield(A),
    Skip,
    Continue1(&'a S),
    Continue2(&'a S, &'a S),
    Continue(Vec<&'a S>),
}

/**
A pre-order iterator over a tree, driven by a step function.

Children are visited left to right.
*/
pub struct Walk<'a, S, A> {
    stack: Vec<&'a S>,
    step: fn(&'a S) -> Step<'a, S, A>,
}

impl<'a, S, A> Walk<'a, S, A> {
    pub fn new(root: &'a S, step: fn(&'a S) -> Step<'a, S, A>) -> Self {
        Walk {
            stack: vec![root],
            step,
        }
    }
}

impl<'a, S, A> Iterator for Walk<'a, S, A> {
    type Item = A;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            match (self.step)(current) {
                Step::Yield(item) => return Some(item),
                Step::Skip => {}
                Step::Continue1(item) => self.stack.push(item),
                Step::Continue2(item1, item2) => {
                    self.stack.push(item2);
                    self.stack.push(item1);
                }
                Step::Continue(items) => self.stack.extend(items.into_iter().rev()),
            }
        }
        None
    }
}
