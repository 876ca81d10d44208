use crate::error::BotError;
use crate::heuristics::{MoveImpactHeuristic, PositionalHeuristic};
use crate::scoring::ScoringEngine;
use crate::weighting::SliderModel;
use core::fmt;
use crush_core::model::board::Board;
use crush_core::model::moves::Move;

/// Handle into a [`GameTree`]. Slots are recycled once released, so a handle
/// is only meaningful during the search that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Created, own move not scored yet.
    Unexpanded,
    /// Own move scored; utility and extra-turn flag are valid.
    Scored,
    /// Children attached.
    Expanded,
    /// Board dropped. Utility stays readable.
    Released,
}

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    board: Option<Board>,
    mv: Option<Move>,
    utility: f64,
    extra_turn: bool,
    /// Set once by scoring; later states never clear it.
    scored: bool,
    state: NodeState,
    level: usize,
}

impl Node {
    fn new(parent: Option<NodeId>, board: Board, mv: Option<Move>, level: usize) -> Self {
        Self {
            parent,
            children: Vec::new(),
            board: Some(board),
            mv,
            utility: 0.0,
            extra_turn: false,
            scored: false,
            state: NodeState::Unexpanded,
            level,
        }
    }
}

/// Arena holding the search tree. Parents own their children through ids;
/// the parent link is a plain back-reference used for look-ups.
#[derive(Debug, Default)]
pub struct GameTree {
    slots: Vec<Option<Node>>,
    root: Option<NodeId>,
    free: Vec<usize>,
    live: usize,
    created: usize,
    peak_live: usize,
}

impl GameTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every node, keeping the allocated slots for reuse.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            *slot = None;
            self.free.push(index);
        }
        self.root = None;
        self.live = 0;
        self.created = 0;
        self.peak_live = 0;
    }

    pub fn add_root(&mut self, board: Board) -> NodeId {
        let root = self.insert(Node::new(None, board, None, 0));
        self.root = Some(root);
        root
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Nodes currently held in the arena.
    pub fn live_nodes(&self) -> usize {
        self.live
    }

    /// Nodes created since the last [`GameTree::clear`].
    pub fn nodes_created(&self) -> usize {
        self.created
    }

    pub fn peak_live_nodes(&self) -> usize {
        self.peak_live
    }

    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.slots.get(id.0), Some(Some(_)))
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, BotError> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], BotError> {
        Ok(&self.node(id)?.children)
    }

    pub fn board(&self, id: NodeId) -> Result<Option<&Board>, BotError> {
        Ok(self.node(id)?.board.as_ref())
    }

    pub fn mv(&self, id: NodeId) -> Result<Option<Move>, BotError> {
        Ok(self.node(id)?.mv)
    }

    pub fn utility(&self, id: NodeId) -> Result<f64, BotError> {
        Ok(self.node(id)?.utility)
    }

    pub fn state(&self, id: NodeId) -> Result<NodeState, BotError> {
        Ok(self.node(id)?.state)
    }

    pub fn level(&self, id: NodeId) -> Result<usize, BotError> {
        Ok(self.node(id)?.level)
    }

    pub fn set_utility(&mut self, id: NodeId, utility: f64) -> Result<(), BotError> {
        self.node_mut(id)?.utility = utility;
        Ok(())
    }

    /// Whether this node's move granted another move to the same side.
    pub fn extra_turn(&self, id: NodeId) -> Result<bool, BotError> {
        let node = self.node(id)?;
        if !node.scored {
            return Err(BotError::NonEvaluatedNode(id));
        }
        Ok(node.extra_turn)
    }

    /// Scores the move that led to `id` against its parent's board.
    ///
    /// The root scores `0.0`. The composite is negated when the move was not
    /// made by the maximizing side.
    pub fn evaluate_own_move(
        &mut self,
        id: NodeId,
        maximizing: bool,
        slider_factor: f64,
    ) -> Result<f64, BotError> {
        let node = self.node(id)?;
        let (utility, extra_turn) = match (node.parent, node.mv) {
            (None, _) => (0.0, false),
            (Some(parent), Some(mv)) => {
                let board = self.node(parent)?.board.as_ref().ok_or_else(|| {
                    BotError::InvalidArgument(format!("parent {parent} of {id} has no board"))
                })?;
                let (score, extra_turn) = score_move(board, mv, slider_factor)?;
                let utility = if maximizing { score } else { -score };
                (utility, extra_turn)
            }
            (Some(_), None) => {
                return Err(BotError::InvalidArgument(format!("node {id} has no move")));
            }
        };

        let node = self.node_mut(id)?;
        node.utility = utility;
        node.extra_turn = extra_turn;
        node.scored = true;
        node.state = NodeState::Scored;
        Ok(utility)
    }

    /// Attaches one child per legal move of the node's own board.
    pub fn expand(&mut self, id: NodeId) -> Result<&[NodeId], BotError> {
        let moves = self.require_board(id)?.legal_moves();
        self.expand_with(id, &moves)
    }

    /// Attaches one child per supplied move, each holding the fully resolved
    /// board after that move.
    pub fn expand_with(&mut self, id: NodeId, moves: &[Move]) -> Result<&[NodeId], BotError> {
        let level = self.node(id)?.level + 1;
        let boards = {
            let board = self.require_board(id)?;
            moves
                .iter()
                .map(|mv| board.after_full_resolution(mv))
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut children = Vec::with_capacity(moves.len());
        for (mv, board) in moves.iter().zip(boards) {
            children.push(self.insert(Node::new(Some(id), board, Some(*mv), level)));
        }

        let node = self.node_mut(id)?;
        node.children = children;
        node.state = NodeState::Expanded;
        Ok(&node.children)
    }

    /// Drops the node's board. Its utility, move and children stay.
    pub fn release_board(&mut self, id: NodeId) -> Result<(), BotError> {
        let node = self.node_mut(id)?;
        node.board = None;
        node.state = NodeState::Released;
        Ok(())
    }

    /// Removes every descendant of `id` from the arena.
    pub fn release_children(&mut self, id: NodeId) -> Result<(), BotError> {
        let mut pending = std::mem::take(&mut self.node_mut(id)?.children);
        while let Some(child) = pending.pop() {
            if let Some(node) = self.slots.get_mut(child.0).and_then(Option::take) {
                pending.extend(node.children);
                self.free.push(child.0);
                self.live -= 1;
            }
        }
        Ok(())
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                index
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.live += 1;
        self.created += 1;
        self.peak_live = self.peak_live.max(self.live);
        NodeId(index)
    }

    fn node(&self, id: NodeId) -> Result<&Node, BotError> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| stale(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, BotError> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| stale(id))
    }

    fn require_board(&self, id: NodeId) -> Result<&Board, BotError> {
        self.node(id)?
            .board
            .as_ref()
            .ok_or_else(|| BotError::InvalidArgument(format!("node {id} has released its board")))
    }
}

fn stale(id: NodeId) -> BotError {
    BotError::InvalidArgument(format!("node {id} is not in the tree"))
}

/// Composite score of `mv` on `board`: impact on the top tier, position on
/// the bottom one. Built fresh for every call.
pub(crate) fn score_move(
    board: &Board,
    mv: Move,
    slider_factor: f64,
) -> Result<(f64, bool), BotError> {
    let impact = MoveImpactHeuristic::new(board, mv);
    let position = PositionalHeuristic::new(board, mv);

    let mut engine = ScoringEngine::new(SliderModel::new(slider_factor));
    engine
        .add(&impact, SliderModel::VERY_HIGH)
        .add(&position, SliderModel::VERY_LOW);
    let score = engine.evaluate()?;

    let extra_turn = impact.granted_extra_turn().unwrap_or(false);
    Ok((score, extra_turn))
}
